//! Fakes shared by the unit tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicI64, Ordering},
};

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId, UserId};

use crate::{
    clock::Clock,
    platform::{Platform, PlatformError},
    storage::{ModerationStore, SledStore},
};

pub fn temp_store() -> Arc<dyn ModerationStore> {
    let db = sled::Config::new().temporary(true).open().unwrap();
    Arc::new(SledStore::new(&db).unwrap())
}

pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self(AtomicI64::new(now))
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Delete(ChatId, MessageId),
    Send(ChatId, String),
    Restrict(ChatId, UserId, Option<u64>),
    Ban(ChatId, UserId, Option<u64>),
    Unban(ChatId, UserId),
    Unrestrict(ChatId, UserId),
}

/// Records every call; restriction calls can be made to fail.
#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<Call>>,
    pub fail_restrictions: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl RecordingPlatform {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Everything except sent messages.
    pub fn actions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::Send(..)))
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn restriction(&self, call: Call, action: &'static str) -> Result<(), PlatformError> {
        self.push(call);
        if self.fail_restrictions.load(Ordering::SeqCst) {
            return Err(PlatformError::new(action, "not enough rights"));
        }
        Ok(())
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), PlatformError> {
        self.push(Call::Delete(chat_id, message_id));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PlatformError::new("delete_message", "message can't be deleted"));
        }
        Ok(())
    }

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), PlatformError> {
        self.push(Call::Send(chat_id, text.to_string()));
        Ok(())
    }

    async fn restrict_sending_for(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        duration_secs: Option<u64>,
    ) -> Result<(), PlatformError> {
        self.restriction(Call::Restrict(chat_id, user_id, duration_secs), "restrict_chat_member")
    }

    async fn ban_user(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        duration_secs: Option<u64>,
    ) -> Result<(), PlatformError> {
        self.restriction(Call::Ban(chat_id, user_id, duration_secs), "ban_chat_member")
    }

    async fn unban_user(&self, chat_id: ChatId, user_id: UserId) -> Result<(), PlatformError> {
        self.restriction(Call::Unban(chat_id, user_id), "unban_chat_member")
    }

    async fn unrestrict(&self, chat_id: ChatId, user_id: UserId) -> Result<(), PlatformError> {
        self.restriction(Call::Unrestrict(chat_id, user_id), "restrict_chat_member")
    }
}
