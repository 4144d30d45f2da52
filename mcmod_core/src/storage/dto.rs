use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, UserId};

/// Advertising permit for one (chat, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    /// `None` means the permit never expires.
    pub expires_at: Option<i64>,
    pub last_ad_sent_at: Option<i64>,
    pub granted_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanctionKind {
    Warn,
    Mute,
    Ban,
    Kick,
    Unwarn,
    Unmute,
    Unban,
}

impl SanctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SanctionKind::Warn => "warn",
            SanctionKind::Mute => "mute",
            SanctionKind::Ban => "ban",
            SanctionKind::Kick => "kick",
            SanctionKind::Unwarn => "unwarn",
            SanctionKind::Unmute => "unmute",
            SanctionKind::Unban => "unban",
        }
    }

    /// Mutes and bans stay in force until they expire or are lifted.
    pub fn is_restriction(&self) -> bool {
        matches!(self, SanctionKind::Mute | SanctionKind::Ban)
    }

    /// True if a later record of kind `later` ends a restriction of this kind.
    pub fn superseded_by(&self, later: SanctionKind) -> bool {
        match self {
            SanctionKind::Mute => matches!(later, SanctionKind::Mute | SanctionKind::Unmute),
            SanctionKind::Ban => matches!(
                later,
                SanctionKind::Ban | SanctionKind::Unban | SanctionKind::Kick
            ),
            _ => false,
        }
    }
}

/// Immutable history entry for a manually issued sanction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionRecord {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub kind: SanctionKind,
    pub until: Option<i64>,
    pub reason: String,
    pub admin_id: UserId,
    pub created_at: i64,
}

/// Snapshot of an automatically deleted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedAdEntry {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub display_name: String,
    pub text: String,
    pub reason: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownChat {
    pub chat_id: ChatId,
    pub title: String,
    pub last_seen: i64,
}

/// One page of a newest-first listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, already clamped into `1..=pages`.
    pub page: usize,
    pub pages: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn paginate(all: Vec<T>, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total = all.len();
        let pages = total.div_ceil(page_size).max(1);
        let page = page.clamp(1, pages);
        let items = all
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();
        Self {
            items,
            page,
            pages,
            total,
        }
    }
}
