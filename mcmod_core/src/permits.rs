use std::sync::Arc;

use teloxide::types::{ChatId, UserId};

use crate::{
    clock::Clock,
    storage::{CounterKind, ModerationStore, StoreResult, dto::Permit},
};

/// Advertising permits and the per-permit posting cooldown.
#[derive(Clone)]
pub struct PermitBook {
    store: Arc<dyn ModerationStore>,
    clock: Arc<dyn Clock>,
    cooldown_secs: u64,
}

impl PermitBook {
    pub fn new(store: Arc<dyn ModerationStore>, clock: Arc<dyn Clock>, cooldown_secs: u64) -> Self {
        Self {
            store,
            clock,
            cooldown_secs,
        }
    }

    /// Lapsed permits stay in storage but are not active.
    pub fn is_active(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<bool> {
        let now = self.clock.now();
        Ok(match self.store.get_permit(chat_id, user_id)? {
            None => false,
            Some(Permit {
                expires_at: None, ..
            }) => true,
            Some(Permit {
                expires_at: Some(expires_at),
                ..
            }) => expires_at > now,
        })
    }

    pub fn get(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<Option<Permit>> {
        self.store.get_permit(chat_id, user_id)
    }

    /// Grants or re-grants a permit, keeping any earlier `last_ad_sent_at`.
    pub fn grant(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        duration_secs: Option<u64>,
    ) -> StoreResult<Permit> {
        let now = self.clock.now();
        let last_ad_sent_at = self
            .store
            .get_permit(chat_id, user_id)?
            .and_then(|p| p.last_ad_sent_at);
        let permit = Permit {
            expires_at: duration_secs.map(|secs| now.saturating_add(secs as i64)),
            last_ad_sent_at,
            granted_at: now,
        };
        self.store.put_permit(chat_id, user_id, &permit)?;
        Ok(permit)
    }

    /// Removes the permit with its cooldown state. Revoking nothing is fine.
    pub fn revoke(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<()> {
        self.store.delete_permit(chat_id, user_id)?;
        self.store
            .reset_counter(CounterKind::CooldownViolations, chat_id, user_id)
    }

    pub fn mark_ad_sent(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<()> {
        let now = self.clock.now();
        if let Some(mut permit) = self.store.get_permit(chat_id, user_id)? {
            permit.last_ad_sent_at = Some(now);
            self.store.put_permit(chat_id, user_id, &permit)?;
        }
        Ok(())
    }

    /// Seconds until the next ad is allowed; 0 if none was ever posted.
    pub fn cooldown_remaining(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<u64> {
        let now = self.clock.now();
        let last = self
            .store
            .get_permit(chat_id, user_id)?
            .and_then(|p| p.last_ad_sent_at);
        Ok(match last {
            None => 0,
            Some(last) => {
                let elapsed = now.saturating_sub(last).max(0) as u64;
                self.cooldown_secs.saturating_sub(elapsed)
            }
        })
    }
}
