pub mod dto;
pub mod sled_store;

use teloxide::types::{ChatId, UserId};
use thiserror::Error;

use crate::storage::dto::{DeletedAdEntry, KnownChat, Permit, SanctionRecord};

pub use sled_store::SledStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The per-(chat, user) counters kept by the engines. Each is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// Position on the automatic no-permit ladder.
    Strikes,
    /// Manually issued `/mcwarn` warnings.
    AdminWarns,
    /// Cooldown violations by permitted users.
    CooldownViolations,
}

/// Persistence used by the moderation and sanction engines.
///
/// Every lookup defaults to "nothing stored" when a record is absent.
/// Writes overwrite, so retrying any of them is harmless.
pub trait ModerationStore: Send + Sync {
    fn get_permit(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<Option<Permit>>;
    fn put_permit(&self, chat_id: ChatId, user_id: UserId, permit: &Permit) -> StoreResult<()>;
    fn delete_permit(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<()>;

    fn get_counter(&self, kind: CounterKind, chat_id: ChatId, user_id: UserId) -> StoreResult<u32>;
    fn set_counter(
        &self,
        kind: CounterKind,
        chat_id: ChatId,
        user_id: UserId,
        value: u32,
    ) -> StoreResult<()>;
    fn reset_counter(&self, kind: CounterKind, chat_id: ChatId, user_id: UserId) -> StoreResult<()>;

    fn append_sanction(&self, record: &SanctionRecord) -> StoreResult<()>;
    /// Full sanction history of a chat, newest first.
    fn sanctions(&self, chat_id: ChatId) -> StoreResult<Vec<SanctionRecord>>;

    fn append_deleted_ad(&self, entry: &DeletedAdEntry) -> StoreResult<()>;
    /// Deleted-ad log of a chat, newest first.
    fn deleted_ads(&self, chat_id: ChatId) -> StoreResult<Vec<DeletedAdEntry>>;

    fn upsert_chat(&self, chat: &KnownChat) -> StoreResult<()>;
    fn known_chats(&self) -> StoreResult<Vec<KnownChat>>;

    fn upsert_username(&self, username: &str, user_id: UserId) -> StoreResult<()>;
    fn lookup_username(&self, username: &str) -> StoreResult<Option<UserId>>;
}
