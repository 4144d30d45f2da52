use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId, UserId};
use thiserror::Error;

/// A rejected platform call, usually because the bot lacks admin rights.
#[derive(Debug, Clone, Error)]
#[error("{action} failed: {message}")]
pub struct PlatformError {
    pub action: &'static str,
    pub message: String,
}

impl PlatformError {
    pub fn new(action: &'static str, message: impl Into<String>) -> Self {
        Self {
            action,
            message: message.into(),
        }
    }
}

/// Outbound side of the messaging platform. Text is sent as HTML.
///
/// Durations are in seconds; `None` means no expiry.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), PlatformError>;
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), PlatformError>;
    async fn restrict_sending_for(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        duration_secs: Option<u64>,
    ) -> Result<(), PlatformError>;
    async fn ban_user(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        duration_secs: Option<u64>,
    ) -> Result<(), PlatformError>;
    async fn unban_user(&self, chat_id: ChatId, user_id: UserId) -> Result<(), PlatformError>;
    async fn unrestrict(&self, chat_id: ChatId, user_id: UserId) -> Result<(), PlatformError>;
}
