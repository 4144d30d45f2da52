pub mod dto;
pub mod notices;

use std::sync::Arc;

use log::{info, warn};
use teloxide::types::{ChatId, UserId};

use crate::{
    classifier::{AdClassifier, dto::Classification},
    clock::Clock,
    config::ModerationConfig,
    counters::Counter,
    helpers::text::{has_hashtag, hashtag_at_end, snippet, user_link},
    moderation::dto::{IgnoreReason, InboundMessage, StrikeStage, Verdict, Violation},
    permits::PermitBook,
    platform::Platform,
    sanction_log::SanctionLog,
    storage::{CounterKind, ModerationStore, StoreResult, dto::DeletedAdEntry},
};

/// Decides, for each group message, whether it is an ad and what follows.
///
/// At most one branch fires per message. Platform failures never abort a
/// branch: counters and logs are still written and the chat is told the bot
/// lacks rights.
#[derive(Clone)]
pub struct ModerationEngine {
    config: Arc<ModerationConfig>,
    classifier: AdClassifier,
    permits: PermitBook,
    strikes: Counter,
    cooldown_violations: Counter,
    log: SanctionLog,
    platform: Arc<dyn Platform>,
    clock: Arc<dyn Clock>,
}

impl ModerationEngine {
    pub fn new(
        config: Arc<ModerationConfig>,
        store: Arc<dyn ModerationStore>,
        platform: Arc<dyn Platform>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, regex::Error> {
        let classifier = AdClassifier::new(&config.keywords, &config.exempt_domains)?;
        Ok(Self {
            permits: PermitBook::new(store.clone(), clock.clone(), config.ad_cooldown_secs),
            strikes: Counter::new(store.clone(), CounterKind::Strikes),
            cooldown_violations: Counter::new(store.clone(), CounterKind::CooldownViolations),
            log: SanctionLog::new(store),
            classifier,
            config,
            platform,
            clock,
        })
    }

    pub async fn handle_message(&self, msg: &InboundMessage) -> StoreResult<Verdict> {
        if msg.is_bot {
            return Ok(Verdict::Ignored(IgnoreReason::BotSender));
        }
        let Some(text) = msg.content() else {
            return Ok(Verdict::Ignored(IgnoreReason::NoText));
        };
        if text.trim_start().starts_with('/') {
            return Ok(Verdict::Ignored(IgnoreReason::Command));
        }

        let tag = self.config.ad_tag.as_str();
        let classification = self.classifier.classify(text);
        let tagged = has_hashtag(text, tag);
        if !classification.is_ad() && !tagged {
            return Ok(Verdict::Ignored(IgnoreReason::Clean));
        }

        let (chat_id, user_id) = (msg.chat_id, msg.user_id);
        let who = user_link(user_id, &msg.display_name, msg.username.as_deref());
        let permitted = self.permits.is_active(chat_id, user_id)?;

        if !permitted && tagged {
            let violation = Violation::HashtagWithoutPermit;
            self.remove(msg, text, &violation).await?;
            self.notify(
                chat_id,
                &notices::no_permit(&who, tag, &self.config.support_contact, &self.config.rules_link),
            )
            .await;
            return Ok(Verdict::Deleted(violation));
        }

        if permitted {
            if !classification.is_ad() {
                return Ok(Verdict::Ignored(IgnoreReason::TaggedNonAd));
            }

            if !hashtag_at_end(text, tag) {
                let violation = Violation::MissingEndTag;
                self.remove(msg, text, &violation).await?;
                self.notify(chat_id, &notices::missing_end_tag(&who, tag)).await;
                return Ok(Verdict::Deleted(violation));
            }

            let remaining_secs = self.permits.cooldown_remaining(chat_id, user_id)?;
            if remaining_secs > 0 {
                let permit_revoked = self.apply_cooldown_policy(chat_id, user_id)?;
                let violation = Violation::Cooldown {
                    remaining_secs,
                    permit_revoked,
                };
                self.remove(msg, text, &violation).await?;
                self.notify(chat_id, &notices::cooldown(&who, remaining_secs)).await;
                if permit_revoked {
                    let limit = self.config.cooldown_abuse_limit.unwrap_or_default();
                    self.notify(chat_id, &notices::permit_revoked_for_abuse(&who, limit))
                        .await;
                }
                return Ok(Verdict::Deleted(violation));
            }

            self.permits.mark_ad_sent(chat_id, user_id)?;
            info!("Accepted ad from user {} in chat {}", user_id, chat_id);
            return Ok(Verdict::Accepted);
        }

        let reason = match &classification {
            Classification::Advertisement(reason) => reason.to_string(),
            _ => return Ok(Verdict::Ignored(IgnoreReason::Clean)),
        };
        self.strike(msg, text, &who, reason).await
    }

    async fn strike(
        &self,
        msg: &InboundMessage,
        text: &str,
        who: &str,
        reason: String,
    ) -> StoreResult<Verdict> {
        let (chat_id, user_id) = (msg.chat_id, msg.user_id);
        let strike = self.strikes.get(chat_id, user_id)?.saturating_add(1);
        let stage = match strike {
            1 => StrikeStage::Warning,
            2 => StrikeStage::ShortMute,
            _ => StrikeStage::LongMute,
        };
        let violation = Violation::Unauthorized {
            reason: reason.clone(),
            stage,
        };
        self.remove(msg, text, &violation).await?;

        match stage {
            StrikeStage::Warning => {
                self.strikes.set(chat_id, user_id, 1)?;
                self.notify(
                    chat_id,
                    &notices::strike_warning(who, &reason, &self.config.ad_tag),
                )
                .await;
            }
            StrikeStage::ShortMute => {
                self.strikes.set(chat_id, user_id, 2)?;
                let secs = self.config.strike_short_mute_secs;
                self.notify(chat_id, &notices::strike_mute(who, &reason, secs, false))
                    .await;
                self.mute(chat_id, user_id, secs).await;
            }
            StrikeStage::LongMute => {
                self.strikes.reset(chat_id, user_id)?;
                let secs = self.config.strike_long_mute_secs;
                self.notify(chat_id, &notices::strike_mute(who, &reason, secs, true))
                    .await;
                self.mute(chat_id, user_id, secs).await;
            }
        }
        info!(
            "Strike {} ({:?}) for user {} in chat {}: {}",
            strike, stage, user_id, chat_id, reason
        );
        Ok(Verdict::Deleted(violation))
    }

    /// Returns true if this violation cost the user their permit.
    fn apply_cooldown_policy(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<bool> {
        let Some(limit) = self.config.cooldown_abuse_limit else {
            return Ok(false);
        };
        let violations = self.cooldown_violations.increment(chat_id, user_id)?;
        if violations < limit {
            return Ok(false);
        }
        self.permits.revoke(chat_id, user_id)?;
        info!(
            "Revoked permit of user {} in chat {} after {} cooldown violations",
            user_id, chat_id, violations
        );
        Ok(true)
    }

    // delete, then log whether or not the delete went through
    async fn remove(&self, msg: &InboundMessage, text: &str, violation: &Violation) -> StoreResult<()> {
        let reason = violation.log_reason();
        if let Err(e) = self.platform.delete_message(msg.chat_id, msg.message_id).await {
            warn!(
                "Failed to delete message {} in chat {}: {}",
                msg.message_id.0, msg.chat_id, e
            );
            self.notify(msg.chat_id, &notices::missing_rights()).await;
        }
        self.log.record_deleted_ad(&DeletedAdEntry {
            chat_id: msg.chat_id,
            user_id: msg.user_id,
            username: msg.username.clone(),
            display_name: msg.display_name.clone(),
            text: snippet(text, self.config.snippet_max_chars),
            reason: reason.clone(),
            created_at: self.clock.now(),
        })?;
        info!(
            "Deleted message {} from user {} in chat {}: {}",
            msg.message_id.0, msg.user_id, msg.chat_id, reason
        );
        Ok(())
    }

    async fn mute(&self, chat_id: ChatId, user_id: UserId, secs: u64) {
        if let Err(e) = self
            .platform
            .restrict_sending_for(chat_id, user_id, Some(secs))
            .await
        {
            warn!("Failed to mute user {} in chat {}: {}", user_id, chat_id, e);
            self.notify(chat_id, &notices::missing_rights()).await;
        }
    }

    async fn notify(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.platform.send_message(chat_id, text).await {
            warn!("Failed to send notice to chat {}: {}", chat_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use teloxide::types::MessageId;

    use super::*;
    use crate::testing::{Call, ManualClock, RecordingPlatform, temp_store};

    const CHAT: ChatId = ChatId(-100_200_300);
    const USER: UserId = UserId(4242);
    const MSG: MessageId = MessageId(17);
    const T0: i64 = 1_700_000_000;

    struct Harness {
        engine: ModerationEngine,
        platform: Arc<RecordingPlatform>,
        clock: Arc<ManualClock>,
        store: Arc<dyn ModerationStore>,
        permits: PermitBook,
    }

    fn harness_with(config: ModerationConfig) -> Harness {
        let store = temp_store();
        let platform = Arc::new(RecordingPlatform::default());
        let clock = Arc::new(ManualClock::new(T0));
        let config = Arc::new(config);
        let engine =
            ModerationEngine::new(config.clone(), store.clone(), platform.clone(), clock.clone())
                .unwrap();
        let permits = PermitBook::new(store.clone(), clock.clone(), config.ad_cooldown_secs);
        Harness {
            engine,
            platform,
            clock,
            store,
            permits,
        }
    }

    fn harness() -> Harness {
        harness_with(ModerationConfig::default())
    }

    fn message(text: &str) -> InboundMessage {
        InboundMessage {
            chat_id: CHAT,
            chat_title: "Minecraft chat".to_string(),
            message_id: MSG,
            user_id: USER,
            username: Some("steve".to_string()),
            display_name: "Steve".to_string(),
            is_bot: false,
            text: Some(text.to_string()),
            caption: None,
            reply_to: None,
            is_edited: false,
        }
    }

    impl Harness {
        fn strikes(&self) -> u32 {
            self.store
                .get_counter(CounterKind::Strikes, CHAT, USER)
                .unwrap()
        }

        fn log_reasons(&self) -> Vec<String> {
            self.store
                .deleted_ads(CHAT)
                .unwrap()
                .into_iter()
                .map(|e| e.reason)
                .collect()
        }
    }

    #[tokio::test]
    async fn test_commands_are_never_moderated() {
        let h = harness();
        let verdict = h.engine.handle_message(&message("/mcwarn t.me/shop")).await.unwrap();
        assert_eq!(verdict, Verdict::Ignored(IgnoreReason::Command));
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_clean_and_mention_only_messages_are_ignored() {
        let h = harness();
        for text in ["gg, nice base", "@steve_mc come online"] {
            let verdict = h.engine.handle_message(&message(text)).await.unwrap();
            assert_eq!(verdict, Verdict::Ignored(IgnoreReason::Clean), "{text}");
        }
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bot_senders_are_skipped() {
        let h = harness();
        let mut msg = message("t.me/shop");
        msg.is_bot = true;
        let verdict = h.engine.handle_message(&msg).await.unwrap();
        assert_eq!(verdict, Verdict::Ignored(IgnoreReason::BotSender));
    }

    #[tokio::test]
    async fn test_invite_glued_onto_video_link_is_deleted() {
        let h = harness();
        let verdict = h
            .engine
            .handle_message(&message("youtube.com/watch,t.me/mychannel"))
            .await
            .unwrap();
        assert_eq!(
            verdict,
            Verdict::Deleted(Violation::Unauthorized {
                reason: "link/address".to_string(),
                stage: StrikeStage::Warning,
            })
        );
        assert_eq!(h.strikes(), 1);
    }

    #[tokio::test]
    async fn test_hashtag_without_permit_wins_over_other_signals() {
        let h = harness();
        for text in ["nice build #реклама", "Selling at t.me/shop #реклама"] {
            h.platform.clear();
            let verdict = h.engine.handle_message(&message(text)).await.unwrap();
            assert_eq!(verdict, Verdict::Deleted(Violation::HashtagWithoutPermit));
            assert_eq!(h.platform.actions(), vec![Call::Delete(CHAT, MSG)]);
            assert!(h.platform.sent()[0].contains("advertising permit"));
        }
        assert_eq!(h.strikes(), 0);
        assert_eq!(h.log_reasons(), vec!["hashtag without permit"; 2]);
    }

    #[tokio::test]
    async fn test_scenario_a_permitted_ad_is_kept() {
        let h = harness();
        h.permits.grant(CHAT, USER, None).unwrap();

        let verdict = h
            .engine
            .handle_message(&message("Selling a diamond pickaxe #реклама"))
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Accepted);
        assert!(h.platform.calls().is_empty());
        let permit = h.permits.get(CHAT, USER).unwrap().unwrap();
        assert_eq!(permit.last_ad_sent_at, Some(T0));
    }

    #[tokio::test]
    async fn test_scenario_b_repost_within_cooldown_is_deleted() {
        let h = harness();
        h.permits.grant(CHAT, USER, None).unwrap();
        let ad = message("Selling a diamond pickaxe #реклама");
        h.engine.handle_message(&ad).await.unwrap();

        h.clock.advance(3_600);
        let verdict = h.engine.handle_message(&ad).await.unwrap();

        assert_eq!(
            verdict,
            Verdict::Deleted(Violation::Cooldown {
                remaining_secs: 82_800,
                permit_revoked: false,
            })
        );
        assert_eq!(h.platform.actions(), vec![Call::Delete(CHAT, MSG)]);
        assert!(h.platform.sent()[0].contains("23 hours"));
        assert_eq!(h.strikes(), 0);
        assert_eq!(h.log_reasons(), vec!["cooldown"]);
        let permit = h.permits.get(CHAT, USER).unwrap().unwrap();
        assert_eq!(permit.last_ad_sent_at, Some(T0));
    }

    #[tokio::test]
    async fn test_cooldown_ends_after_a_day() {
        let h = harness();
        h.permits.grant(CHAT, USER, None).unwrap();
        let ad = message("Selling a diamond pickaxe #реклама");
        h.engine.handle_message(&ad).await.unwrap();

        h.clock.advance(86_400);
        assert_eq!(h.engine.handle_message(&ad).await.unwrap(), Verdict::Accepted);
    }

    #[tokio::test]
    async fn test_tag_must_be_at_the_end() {
        let h = harness();
        h.permits.grant(CHAT, USER, None).unwrap();

        let verdict = h
            .engine
            .handle_message(&message("#реклама Selling a diamond pickaxe"))
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Deleted(Violation::MissingEndTag));
        assert!(h.platform.sent()[0].contains("very end"));
        assert_eq!(h.permits.get(CHAT, USER).unwrap().unwrap().last_ad_sent_at, None);
        assert_eq!(h.strikes(), 0);
    }

    #[tokio::test]
    async fn test_permitted_tag_without_ad_signal_is_left_alone() {
        let h = harness();
        h.permits.grant(CHAT, USER, None).unwrap();
        let verdict = h
            .engine
            .handle_message(&message("look at my castle #реклама"))
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Ignored(IgnoreReason::TaggedNonAd));
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lapsed_permit_counts_as_no_permit() {
        let h = harness();
        h.permits.grant(CHAT, USER, Some(60)).unwrap();
        h.clock.advance(61);
        let verdict = h
            .engine
            .handle_message(&message("Selling a diamond pickaxe #реклама"))
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Deleted(Violation::HashtagWithoutPermit));
    }

    #[tokio::test]
    async fn test_scenario_c_strike_ladder() {
        let h = harness();
        let ad = message("t.me/somechannel");
        let mut stages = Vec::new();
        for _ in 0..4 {
            match h.engine.handle_message(&ad).await.unwrap() {
                Verdict::Deleted(Violation::Unauthorized { reason, stage }) => {
                    assert_eq!(reason, "telegram link");
                    stages.push(stage);
                }
                other => panic!("unexpected verdict {other:?}"),
            }
            if stages.len() == 3 {
                assert_eq!(h.strikes(), 0);
            }
        }

        assert_eq!(
            stages,
            vec![
                StrikeStage::Warning,
                StrikeStage::ShortMute,
                StrikeStage::LongMute,
                StrikeStage::Warning,
            ]
        );
        assert_eq!(
            h.platform.actions(),
            vec![
                Call::Delete(CHAT, MSG),
                Call::Delete(CHAT, MSG),
                Call::Restrict(CHAT, USER, Some(10_800)),
                Call::Delete(CHAT, MSG),
                Call::Restrict(CHAT, USER, Some(43_200)),
                Call::Delete(CHAT, MSG),
            ]
        );
        assert_eq!(h.strikes(), 1);
        assert_eq!(h.log_reasons(), vec!["telegram link"; 4]);
    }

    #[tokio::test]
    async fn test_mute_failure_still_advances_ladder() {
        let h = harness();
        h.platform.fail_restrictions.store(true, Ordering::SeqCst);
        let ad = message("call me 89123456789");
        h.engine.handle_message(&ad).await.unwrap();
        let verdict = h.engine.handle_message(&ad).await.unwrap();

        assert_eq!(
            verdict,
            Verdict::Deleted(Violation::Unauthorized {
                reason: "phone number".to_string(),
                stage: StrikeStage::ShortMute,
            })
        );
        assert_eq!(h.strikes(), 2);
        assert!(h.platform.sent().iter().any(|t| t.contains("admin rights")));
    }

    #[tokio::test]
    async fn test_delete_failure_is_still_logged() {
        let h = harness();
        h.platform.fail_deletes.store(true, Ordering::SeqCst);
        h.engine.handle_message(&message("selling swords")).await.unwrap();
        assert_eq!(h.log_reasons(), vec!["keyword: selling"]);
        assert_eq!(h.strikes(), 1);
        assert!(h.platform.sent().iter().any(|t| t.contains("admin rights")));
    }

    #[tokio::test]
    async fn test_strikes_leave_admin_warns_alone() {
        let h = harness();
        h.store
            .set_counter(CounterKind::AdminWarns, CHAT, USER, 2)
            .unwrap();
        for _ in 0..3 {
            h.engine.handle_message(&message("t.me/shop")).await.unwrap();
        }
        assert_eq!(
            h.store.get_counter(CounterKind::AdminWarns, CHAT, USER).unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_edited_and_captioned_messages_are_judged_the_same() {
        let h = harness();
        let mut edited = message("t.me/shop");
        edited.is_edited = true;
        let mut captioned = message("");
        captioned.text = None;
        captioned.caption = Some("t.me/shop".to_string());

        let first = h.engine.handle_message(&edited).await.unwrap();
        let second = h.engine.handle_message(&captioned).await.unwrap();

        assert!(matches!(
            first,
            Verdict::Deleted(Violation::Unauthorized { stage: StrikeStage::Warning, .. })
        ));
        assert!(matches!(
            second,
            Verdict::Deleted(Violation::Unauthorized { stage: StrikeStage::ShortMute, .. })
        ));
    }

    #[tokio::test]
    async fn test_cooldown_abuse_revokes_permit_when_enabled() {
        let h = harness_with(ModerationConfig {
            cooldown_abuse_limit: Some(2),
            ..ModerationConfig::default()
        });
        h.permits.grant(CHAT, USER, None).unwrap();
        let ad = message("Selling a diamond pickaxe #реклама");
        assert_eq!(h.engine.handle_message(&ad).await.unwrap(), Verdict::Accepted);

        h.clock.advance(60);
        let first = h.engine.handle_message(&ad).await.unwrap();
        assert!(matches!(
            first,
            Verdict::Deleted(Violation::Cooldown { permit_revoked: false, .. })
        ));
        let second = h.engine.handle_message(&ad).await.unwrap();
        assert!(matches!(
            second,
            Verdict::Deleted(Violation::Cooldown { permit_revoked: true, .. })
        ));
        assert!(!h.permits.is_active(CHAT, USER).unwrap());
        assert!(h.platform.sent().iter().any(|t| t.contains("revoked")));

        let third = h.engine.handle_message(&ad).await.unwrap();
        assert_eq!(third, Verdict::Deleted(Violation::HashtagWithoutPermit));
    }
}
