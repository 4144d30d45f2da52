use std::sync::Arc;

use teloxide::types::{ChatId, UserId};

use crate::storage::{CounterKind, ModerationStore, StoreResult};

/// One of the per-(chat, user) counters. Callers increment before comparing
/// against their thresholds.
#[derive(Clone)]
pub struct Counter {
    store: Arc<dyn ModerationStore>,
    kind: CounterKind,
}

impl Counter {
    pub fn new(store: Arc<dyn ModerationStore>, kind: CounterKind) -> Self {
        Self { store, kind }
    }

    pub fn get(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<u32> {
        self.store.get_counter(self.kind, chat_id, user_id)
    }

    pub fn set(&self, chat_id: ChatId, user_id: UserId, value: u32) -> StoreResult<()> {
        self.store.set_counter(self.kind, chat_id, user_id, value)
    }

    pub fn reset(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<()> {
        self.store.reset_counter(self.kind, chat_id, user_id)
    }

    /// Stores and returns the next value.
    pub fn increment(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<u32> {
        let next = self.get(chat_id, user_id)?.saturating_add(1);
        self.set(chat_id, user_id, next)?;
        Ok(next)
    }
}
