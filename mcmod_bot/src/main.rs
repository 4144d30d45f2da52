mod bot;
mod config;
mod dependencies;
mod platform;
mod utils;

use anyhow::{Context, Result};
use mcmod_core::helpers::bot_commands::Command;
use teloxide::{prelude::*, utils::command::BotCommands};

use crate::{bot::handler_tree::handler_tree, config::BotConfig, dependencies::BotDependencies};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    log::info!("Starting mcmod_bot...");

    let config = BotConfig::from_env()?;
    let bot = Bot::from_env();
    let me = bot.get_me().await.context("Failed to get bot info")?;
    let bot_username = me.user.username.clone().unwrap_or_default();
    let db = sled::open(&config.db_path).context("Failed to open sled DB")?;

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let bot_deps = BotDependencies::new(bot.clone(), &db, config.moderation, bot_username)?;
    log::info!(
        "Moderating as @{} with {} admin(s)",
        bot_deps.bot_username,
        bot_deps.config.admin_ids.len()
    );

    Dispatcher::builder(bot, handler_tree())
        .dependencies(dptree::deps![bot_deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
