use std::sync::Arc;

use anyhow::Result;
use mcmod_core::{
    clock::{Clock, SystemClock},
    config::ModerationConfig,
    directory::Directory,
    moderation::ModerationEngine,
    platform::Platform,
    sanctions::SanctionEngine,
    storage::{ModerationStore, SledStore},
};
use teloxide::Bot;

use crate::platform::TelegramPlatform;

#[derive(Clone)]
pub struct BotDependencies {
    pub config: Arc<ModerationConfig>,
    pub moderation: ModerationEngine,
    pub sanctions: SanctionEngine,
    pub directory: Directory,
    pub bot_username: String,
}

impl BotDependencies {
    pub fn new(bot: Bot, db: &sled::Db, config: ModerationConfig, bot_username: String) -> Result<Self> {
        let config = Arc::new(config);
        let store: Arc<dyn ModerationStore> = Arc::new(SledStore::new(db)?);
        let platform: Arc<dyn Platform> = Arc::new(TelegramPlatform::new(bot));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let moderation =
            ModerationEngine::new(config.clone(), store.clone(), platform.clone(), clock.clone())?;
        let sanctions = SanctionEngine::new(config.clone(), store.clone(), platform, clock.clone());
        let directory = Directory::new(store, clock);

        Ok(Self {
            config,
            moderation,
            sanctions,
            directory,
            bot_username,
        })
    }
}
