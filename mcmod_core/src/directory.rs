use std::sync::Arc;

use teloxide::types::{ChatId, UserId};

use crate::{
    clock::Clock,
    storage::{ModerationStore, StoreResult, dto::KnownChat},
};

/// Chats and usernames the bot has seen, refreshed on every group message.
#[derive(Clone)]
pub struct Directory {
    store: Arc<dyn ModerationStore>,
    clock: Arc<dyn Clock>,
}

impl Directory {
    pub fn new(store: Arc<dyn ModerationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn observe(
        &self,
        chat_id: ChatId,
        chat_title: &str,
        user_id: UserId,
        username: Option<&str>,
    ) -> StoreResult<()> {
        self.store.upsert_chat(&KnownChat {
            chat_id,
            title: chat_title.to_string(),
            last_seen: self.clock.now(),
        })?;
        if let Some(username) = username.filter(|u| !u.is_empty()) {
            self.store.upsert_username(username, user_id)?;
        }
        Ok(())
    }

    pub fn resolve_username(&self, username: &str) -> StoreResult<Option<UserId>> {
        self.store.lookup_username(username)
    }

    /// Most recently active first.
    pub fn known_chats(&self) -> StoreResult<Vec<KnownChat>> {
        self.store.known_chats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, temp_store};

    #[test]
    fn test_observe_records_chat_and_username() {
        let clock = Arc::new(ManualClock::new(100));
        let directory = Directory::new(temp_store(), clock.clone());

        directory
            .observe(ChatId(-1), "Survival", UserId(5), Some("Alex"))
            .unwrap();
        clock.advance(10);
        directory.observe(ChatId(-2), "Creative", UserId(6), None).unwrap();

        assert_eq!(directory.resolve_username("@alex").unwrap(), Some(UserId(5)));
        let chats = directory.known_chats().unwrap();
        assert_eq!(chats[0].title, "Creative");
        assert_eq!(chats[1].last_seen, 100);
    }
}
