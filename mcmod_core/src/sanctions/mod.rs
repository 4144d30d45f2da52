pub mod command;
pub mod render;

use std::sync::{Arc, OnceLock};

use log::{debug, info, warn};
use regex::Regex;
use teloxide::types::{ChatId, UserId};
use thiserror::Error;

use crate::{
    clock::Clock,
    config::ModerationConfig,
    counters::Counter,
    directory::Directory,
    helpers::{
        duration::{DurationError, looks_like_duration, parse_duration},
        text::user_link,
    },
    moderation::dto::InboundMessage,
    permits::PermitBook,
    platform::{Platform, PlatformError},
    sanction_log::SanctionLog,
    sanctions::command::{Action, CommandKind, ParsedCommand},
    storage::{
        CounterKind, ModerationStore, StoreError, StoreResult,
        dto::{SanctionKind, SanctionRecord},
    },
};

const DEFAULT_REASON: &str = "no reason given";
// kicks ban briefly, so a rejected unban cannot leave a permanent ban
const KICK_BAN_SECS: u64 = 60;

/// `Display` is the reply sent to the admin.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("I can't tell who you mean. Reply to their message or give a @username or numeric id.")]
    NoTarget,
    #[error("I haven't seen @{0} yet. Reply to their message or use their numeric id.")]
    UnknownUsername(String),
    #[error("Bots can't be sanctioned.")]
    BotTarget,
    #[error(transparent)]
    InvalidDuration(#[from] DurationError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The sender is not an admin; nothing is said.
    Ignored,
    Rejected(String),
    Completed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    user_id: UserId,
    display_name: String,
    username: Option<String>,
}

impl Target {
    fn link(&self) -> String {
        user_link(self.user_id, &self.display_name, self.username.as_deref())
    }
}

#[derive(Debug)]
struct Arguments {
    target: Target,
    duration_secs: Option<u64>,
    reason: String,
}

fn numeric_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{5,15}$").expect("static regex"))
}

/// Admin-issued sanctions and permit management.
#[derive(Clone)]
pub struct SanctionEngine {
    config: Arc<ModerationConfig>,
    permits: PermitBook,
    warns: Counter,
    log: SanctionLog,
    directory: Directory,
    platform: Arc<dyn Platform>,
    clock: Arc<dyn Clock>,
}

impl SanctionEngine {
    pub fn new(
        config: Arc<ModerationConfig>,
        store: Arc<dyn ModerationStore>,
        platform: Arc<dyn Platform>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            permits: PermitBook::new(store.clone(), clock.clone(), config.ad_cooldown_secs),
            warns: Counter::new(store.clone(), CounterKind::AdminWarns),
            log: SanctionLog::new(store.clone()),
            directory: Directory::new(store, clock.clone()),
            config,
            platform,
            clock,
        }
    }

    /// Runs a command from a group chat and replies there.
    pub async fn handle_command(
        &self,
        msg: &InboundMessage,
        command: &ParsedCommand,
    ) -> StoreResult<CommandOutcome> {
        if !self.config.is_admin(msg.user_id) {
            debug!(
                "Ignoring {:?} from non-admin {} in chat {}",
                command.kind, msg.user_id, msg.chat_id
            );
            return Ok(CommandOutcome::Ignored);
        }

        let outcome = match self.execute(msg, command).await {
            Ok(text) => CommandOutcome::Completed(text),
            Err(CommandError::Store(e)) => return Err(e),
            Err(e) => CommandOutcome::Rejected(e.to_string()),
        };
        if let CommandOutcome::Completed(text) | CommandOutcome::Rejected(text) = &outcome {
            if let Err(e) = self.platform.send_message(msg.chat_id, text).await {
                warn!("Failed to reply in chat {}: {}", msg.chat_id, e);
            }
        }
        Ok(outcome)
    }

    async fn execute(&self, msg: &InboundMessage, command: &ParsedCommand) -> Result<String, CommandError> {
        let chat_id = msg.chat_id;
        let Some(action) = command.kind.action() else {
            return self.listing(chat_id, command);
        };

        let args = self.parse_arguments(msg, action, &command.args)?;
        let target = args.target.user_id;
        let who = args.target.link();
        let now = self.clock.now();

        let reply = match action {
            Action::AdGive => {
                let permit = self.permits.grant(chat_id, target, args.duration_secs)?;
                info!(
                    "Admin {} granted ad permit to {} in chat {} (expires {:?})",
                    msg.user_id, target, chat_id, permit.expires_at
                );
                render::permit_granted(&who, permit.expires_at, &self.config.ad_tag)
            }
            Action::AdRemove => {
                self.permits.revoke(chat_id, target)?;
                info!(
                    "Admin {} revoked ad permit of {} in chat {}",
                    msg.user_id, target, chat_id
                );
                render::permit_revoked(&who)
            }
            Action::Warn => {
                let limit = self.config.warn_limit;
                let warns = self.warns.get(chat_id, target)?.saturating_add(1);
                if warns > limit {
                    let ban_secs = self.config.warn_ban_secs;
                    let reason = format!(
                        "auto-ban for warnings ({}/{}). {}",
                        warns, limit, args.reason
                    );
                    self.warns.reset(chat_id, target)?;
                    self.record(msg, target, SanctionKind::Ban, Some(now + ban_secs as i64), &reason)?;
                    let applied = self
                        .apply(self.platform.ban_user(chat_id, target, Some(ban_secs)).await);
                    with_rights_hint(
                        render::auto_banned(&who, warns, limit, ban_secs, &args.reason),
                        applied,
                    )
                } else {
                    self.warns.set(chat_id, target, warns)?;
                    self.record(msg, target, SanctionKind::Warn, None, &args.reason)?;
                    render::warned(&who, warns, limit, &args.reason)
                }
            }
            Action::Unwarn => {
                self.warns.reset(chat_id, target)?;
                self.record(msg, target, SanctionKind::Unwarn, None, &args.reason)?;
                render::unwarned(&who, &args.reason)
            }
            Action::Mute => {
                let secs = args.duration_secs.unwrap_or(self.config.indefinite_mute_secs);
                let until = Some(now.saturating_add(secs as i64));
                self.record(msg, target, SanctionKind::Mute, until, &args.reason)?;
                let applied = self
                    .apply(self.platform.restrict_sending_for(chat_id, target, Some(secs)).await);
                with_rights_hint(render::muted(&who, until, &args.reason), applied)
            }
            Action::Unmute => {
                self.record(msg, target, SanctionKind::Unmute, None, &args.reason)?;
                let applied = self.apply(self.platform.unrestrict(chat_id, target).await);
                with_rights_hint(render::unmuted(&who, &args.reason), applied)
            }
            Action::Ban => {
                let until = args.duration_secs.map(|secs| now.saturating_add(secs as i64));
                self.record(msg, target, SanctionKind::Ban, until, &args.reason)?;
                let applied = self
                    .apply(self.platform.ban_user(chat_id, target, args.duration_secs).await);
                with_rights_hint(render::banned(&who, until, &args.reason), applied)
            }
            Action::Unban => {
                self.record(msg, target, SanctionKind::Unban, None, &args.reason)?;
                let applied = self.apply(self.platform.unban_user(chat_id, target).await);
                with_rights_hint(render::unbanned(&who, &args.reason), applied)
            }
            Action::Kick => {
                self.record(msg, target, SanctionKind::Kick, None, &args.reason)?;
                let mut applied =
                    self.apply(self.platform.ban_user(chat_id, target, Some(KICK_BAN_SECS)).await);
                if applied {
                    applied = self.apply(self.platform.unban_user(chat_id, target).await);
                }
                with_rights_hint(render::kicked(&who, &args.reason), applied)
            }
        };
        Ok(reply)
    }

    fn listing(&self, chat_id: ChatId, command: &ParsedCommand) -> Result<String, CommandError> {
        let page = page_argument(&command.args);
        if command.kind == CommandKind::AdLogs {
            let page = self
                .log
                .deleted_ads_page(chat_id, page, self.config.deleted_ads_page_size)?;
            return Ok(render::deleted_ads_page(&page));
        }
        let page = self.log.sanction_page(
            chat_id,
            page,
            self.config.sanction_page_size,
            self.clock.now(),
        )?;
        Ok(render::sanction_page(&page))
    }

    /// Target first (explicit argument beats the replied-to author), then
    /// an optional duration, then the free-text reason.
    fn parse_arguments(
        &self,
        msg: &InboundMessage,
        action: Action,
        args: &[String],
    ) -> Result<Arguments, CommandError> {
        let mut rest = args;

        let explicit = match rest.first() {
            Some(arg) => self.resolve_explicit(arg)?,
            None => None,
        };
        let target = match explicit {
            Some(target) => {
                rest = &rest[1..];
                target
            }
            None => match &msg.reply_to {
                Some(reply) if reply.is_bot => return Err(CommandError::BotTarget),
                Some(reply) => Target {
                    user_id: reply.user_id,
                    display_name: reply.display_name.clone(),
                    username: reply.username.clone(),
                },
                None => return Err(CommandError::NoTarget),
            },
        };

        let mut duration_secs = None;
        if action.takes_duration() {
            if let Some(token) = rest.first().filter(|t| looks_like_duration(t)) {
                duration_secs = parse_duration(Some(token.as_str()))?;
                rest = &rest[1..];
            }
        }

        let reason = if rest.is_empty() {
            DEFAULT_REASON.to_string()
        } else {
            rest.join(" ")
        };
        Ok(Arguments {
            target,
            duration_secs,
            reason,
        })
    }

    fn resolve_explicit(&self, arg: &str) -> Result<Option<Target>, CommandError> {
        if let Some(username) = arg.strip_prefix('@') {
            return match self.directory.resolve_username(username)? {
                Some(user_id) => Ok(Some(Target {
                    user_id,
                    display_name: format!("@{}", username),
                    username: Some(username.to_string()),
                })),
                None => Err(CommandError::UnknownUsername(username.to_string())),
            };
        }
        if numeric_id_regex().is_match(arg) {
            if let Ok(id) = arg.parse::<u64>() {
                return Ok(Some(Target {
                    user_id: UserId(id),
                    display_name: "User".to_string(),
                    username: None,
                }));
            }
        }
        Ok(None)
    }

    fn record(
        &self,
        msg: &InboundMessage,
        target: UserId,
        kind: SanctionKind,
        until: Option<i64>,
        reason: &str,
    ) -> StoreResult<()> {
        info!(
            "Admin {} issued {} to {} in chat {} (until {:?}): {}",
            msg.user_id,
            kind.as_str(),
            target,
            msg.chat_id,
            until,
            reason
        );
        self.log.record_sanction(&SanctionRecord {
            chat_id: msg.chat_id,
            user_id: target,
            kind,
            until,
            reason: reason.to_string(),
            admin_id: msg.user_id,
            created_at: self.clock.now(),
        })
    }

    fn apply(&self, result: Result<(), PlatformError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Sanction not applied: {}", e);
                false
            }
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }
}

fn page_argument(args: &[String]) -> usize {
    args.first()
        .and_then(|a| a.parse::<usize>().ok())
        .unwrap_or(1)
}

fn with_rights_hint(reply: String, applied: bool) -> String {
    if applied {
        reply
    } else {
        format!("{}{}", reply, render::missing_rights())
    }
}
