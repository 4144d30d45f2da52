#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    AdGive,
    AdRemove,
    AdLogs,
    Warn,
    Unwarn,
    Mute,
    Unmute,
    Ban,
    Unban,
    Kick,
    List,
}

impl CommandKind {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "adgive" => CommandKind::AdGive,
            "adremove" => CommandKind::AdRemove,
            "adlogs" => CommandKind::AdLogs,
            "mcwarn" => CommandKind::Warn,
            "mcunwarn" => CommandKind::Unwarn,
            "mcmute" => CommandKind::Mute,
            "mcunmute" => CommandKind::Unmute,
            "mcban" => CommandKind::Ban,
            "mcunban" => CommandKind::Unban,
            "mckick" => CommandKind::Kick,
            "mclist" => CommandKind::List,
            _ => return None,
        })
    }

    /// `None` for the listing commands, which take a page instead of a target.
    pub fn action(&self) -> Option<Action> {
        Some(match self {
            CommandKind::AdGive => Action::AdGive,
            CommandKind::AdRemove => Action::AdRemove,
            CommandKind::Warn => Action::Warn,
            CommandKind::Unwarn => Action::Unwarn,
            CommandKind::Mute => Action::Mute,
            CommandKind::Unmute => Action::Unmute,
            CommandKind::Ban => Action::Ban,
            CommandKind::Unban => Action::Unban,
            CommandKind::Kick => Action::Kick,
            CommandKind::List | CommandKind::AdLogs => return None,
        })
    }
}

/// What a targeted command does to its member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AdGive,
    AdRemove,
    Warn,
    Unwarn,
    Mute,
    Unmute,
    Ban,
    Unban,
    Kick,
}

impl Action {
    /// Actions that read an optional duration after the target.
    pub fn takes_duration(&self) -> bool {
        matches!(self, Action::AdGive | Action::Mute | Action::Ban)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub kind: CommandKind,
    pub args: Vec<String>,
}

/// Recognises a moderation command, case-insensitively.
///
/// `/cmd@other_bot` is not ours and yields `None`.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<ParsedCommand> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?.strip_prefix('/')?;
    let (name, mention) = match head.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (head, None),
    };
    if let (Some(mention), Some(ours)) = (mention, bot_username) {
        if !mention.eq_ignore_ascii_case(ours.trim_start_matches('@')) {
            return None;
        }
    }
    let kind = CommandKind::from_name(&name.to_lowercase())?;
    Some(ParsedCommand {
        kind,
        args: tokens.map(str::to_string).collect(),
    })
}
