use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mcmod_core::platform::{Platform, PlatformError};
use teloxide::{
    prelude::*,
    types::{ChatPermissions, MessageId, ParseMode},
};

/// `Platform` backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramPlatform {
    bot: Bot,
}

impl TelegramPlatform {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

// Telegram treats a missing until_date as forever; a date it cannot
// represent is sent the same way.
fn until_date(duration_secs: Option<u64>) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(duration_secs?).ok()?;
    Utc::now().checked_add_signed(TimeDelta::try_seconds(secs)?)
}

fn rejected(action: &'static str, e: teloxide::RequestError) -> PlatformError {
    PlatformError::new(action, e.to_string())
}

#[async_trait]
impl Platform for TelegramPlatform {
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), PlatformError> {
        self.bot
            .delete_message(chat_id, message_id)
            .await
            .map_err(|e| rejected("delete_message", e))?;
        Ok(())
    }

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), PlatformError> {
        self.bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| rejected("send_message", e))?;
        Ok(())
    }

    async fn restrict_sending_for(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        duration_secs: Option<u64>,
    ) -> Result<(), PlatformError> {
        let request = self
            .bot
            .restrict_chat_member(chat_id, user_id, ChatPermissions::empty());
        let result = match until_date(duration_secs) {
            Some(until) => request.until_date(until).await,
            None => request.await,
        };
        result.map_err(|e| rejected("restrict_chat_member", e))?;
        Ok(())
    }

    async fn ban_user(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        duration_secs: Option<u64>,
    ) -> Result<(), PlatformError> {
        let request = self.bot.ban_chat_member(chat_id, user_id);
        let result = match until_date(duration_secs) {
            Some(until) => request.until_date(until).await,
            None => request.await,
        };
        result.map_err(|e| rejected("ban_chat_member", e))?;
        Ok(())
    }

    async fn unban_user(&self, chat_id: ChatId, user_id: UserId) -> Result<(), PlatformError> {
        self.bot
            .unban_chat_member(chat_id, user_id)
            .only_if_banned(true)
            .await
            .map_err(|e| rejected("unban_chat_member", e))?;
        Ok(())
    }

    async fn unrestrict(&self, chat_id: ChatId, user_id: UserId) -> Result<(), PlatformError> {
        self.bot
            .restrict_chat_member(chat_id, user_id, ChatPermissions::all())
            .await
            .map_err(|e| rejected("restrict_chat_member", e))?;
        Ok(())
    }
}
