use teloxide::types::{ChatId, MessageId, UserId};

/// The author of the message a command replies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub user_id: UserId,
    pub username: Option<String>,
    pub display_name: String,
    pub is_bot: bool,
}

/// A group message (new or edited) as seen by the engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub chat_title: String,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub display_name: String,
    pub is_bot: bool,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub reply_to: Option<ReplyTarget>,
    pub is_edited: bool,
}

impl InboundMessage {
    /// Text, falling back to the media caption.
    pub fn content(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    BotSender,
    NoText,
    Command,
    /// Not an ad and not tagged.
    Clean,
    /// Tagged by a permitted user but carrying no ad signal.
    TaggedNonAd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeStage {
    Warning,
    ShortMute,
    LongMute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    HashtagWithoutPermit,
    MissingEndTag,
    Cooldown {
        remaining_secs: u64,
        permit_revoked: bool,
    },
    Unauthorized {
        reason: String,
        stage: StrikeStage,
    },
}

impl Violation {
    /// Reason written to the deleted-ad log.
    pub fn log_reason(&self) -> String {
        match self {
            Violation::HashtagWithoutPermit => "hashtag without permit".to_string(),
            Violation::MissingEndTag => "missing end tag".to_string(),
            Violation::Cooldown { .. } => "cooldown".to_string(),
            Violation::Unauthorized { reason, .. } => reason.clone(),
        }
    }
}

/// What the decision engine did with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Ignored(IgnoreReason),
    /// A permitted, correctly tagged ad outside the cooldown.
    Accepted,
    Deleted(Violation),
}
