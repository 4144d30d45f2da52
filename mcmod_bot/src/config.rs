use std::{collections::HashSet, env};

use anyhow::{Context, Result, bail};
use mcmod_core::config::ModerationConfig;
use teloxide::types::UserId;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub db_path: String,
    pub moderation: ModerationConfig,
}

impl BotConfig {
    /// Reads the process environment. `TELOXIDE_TOKEN` is read by `Bot::from_env`.
    pub fn from_env() -> Result<Self> {
        let admin_ids = parse_admin_ids(&env::var("ADMIN_IDS").context("ADMIN_IDS not set")?)?;
        let mut moderation = ModerationConfig {
            admin_ids,
            ..ModerationConfig::default()
        };

        if let Ok(tag) = env::var("AD_TAG") {
            moderation.ad_tag = tag;
        }
        if let Ok(contact) = env::var("SUPPORT_CONTACT") {
            moderation.support_contact = contact;
        }
        if let Ok(link) = env::var("RULES_LINK") {
            moderation.rules_link = link;
        }
        if let Ok(secs) = env::var("AD_COOLDOWN_SECONDS") {
            moderation.ad_cooldown_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("AD_COOLDOWN_SECONDS is not a number: {}", secs))?;
        }
        if let Ok(limit) = env::var("COOLDOWN_ABUSE_LIMIT") {
            let limit: u32 = limit
                .trim()
                .parse()
                .with_context(|| format!("COOLDOWN_ABUSE_LIMIT is not a number: {}", limit))?;
            moderation.cooldown_abuse_limit = (limit > 0).then_some(limit);
        }

        Ok(Self {
            db_path: env::var("DB_PATH").unwrap_or_else(|_| "mc_bot_db".to_string()),
            moderation,
        })
    }
}

fn parse_admin_ids(raw: &str) -> Result<HashSet<UserId>> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map(UserId)
                .with_context(|| format!("invalid admin id in ADMIN_IDS: {}", s))
        })
        .collect::<Result<HashSet<_>>>()?;
    if ids.is_empty() {
        bail!("ADMIN_IDS must list at least one user id");
    }
    Ok(ids)
}
