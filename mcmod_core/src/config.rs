use std::collections::HashSet;

use teloxide::types::UserId;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// Everything the moderation and sanction engines read, built once at start-up.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    pub admin_ids: HashSet<UserId>,
    pub ad_tag: String,
    pub ad_cooldown_secs: u64,
    pub strike_short_mute_secs: u64,
    pub strike_long_mute_secs: u64,
    /// Ceiling shown to users ("2/3"); the ban fires at `warn_limit + 1`.
    pub warn_limit: u32,
    pub warn_ban_secs: u64,
    pub indefinite_mute_secs: u64,
    pub sanction_page_size: usize,
    pub deleted_ads_page_size: usize,
    pub snippet_max_chars: usize,
    pub keywords: Vec<String>,
    pub exempt_domains: Vec<String>,
    /// Revoke the permit after this many cooldown violations. `None` disables it.
    pub cooldown_abuse_limit: Option<u32>,
    pub support_contact: String,
    pub rules_link: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            admin_ids: HashSet::new(),
            ad_tag: "#реклама".to_string(),
            ad_cooldown_secs: DAY,
            strike_short_mute_secs: 3 * HOUR,
            strike_long_mute_secs: 12 * HOUR,
            warn_limit: 3,
            warn_ban_secs: 3 * DAY,
            indefinite_mute_secs: 3650 * DAY,
            sanction_page_size: 10,
            deleted_ads_page_size: 5,
            snippet_max_chars: 2000,
            keywords: [
                "сдам",
                "продам",
                "куплю",
                "прайс",
                "подпишитесь",
                "подписывайтесь",
                "selling",
                "buying",
                "renting",
                "price-list",
                "subscribe",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            exempt_domains: ["youtube.com", "youtu.be", "tiktok.com", "twitch.tv"]
                .into_iter()
                .map(String::from)
                .collect(),
            cooldown_abuse_limit: None,
            support_contact: "@minecraft_chat_igra_bot".to_string(),
            rules_link: "https://leoned777.github.io/chats/".to_string(),
        }
    }
}

impl ModerationConfig {
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_ids.contains(&user_id)
    }
}
