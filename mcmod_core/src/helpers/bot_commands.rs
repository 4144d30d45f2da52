use teloxide::utils::command::BotCommands;

/// Command menu registered with Telegram and shown by `/help`.
///
/// Group commands are matched case-insensitively by
/// [`crate::sanctions::command::parse_command`]; this enum only describes them.
#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Display this text.")]
    Help,
    #[command(description = "Show the welcome message (DM only).")]
    Start,
    #[command(description = "List the groups the bot has seen (admins only, DM only).")]
    Chats,
    #[command(description = "Grant an advertising permit: [@user|id] [15m|2h|3d|1w|1y].")]
    Adgive(String),
    #[command(description = "Revoke an advertising permit: [@user|id].")]
    Adremove(String),
    #[command(description = "Show deleted advertisements: [page].")]
    Adlogs(String),
    #[command(description = "Warn a user, 4/3 warnings bans for 3 days: [@user|id] [reason].")]
    Mcwarn(String),
    #[command(description = "Clear a user's warnings: [@user|id] [reason].")]
    Mcunwarn(String),
    #[command(description = "Mute a user: [@user|id] [duration] [reason].")]
    Mcmute(String),
    #[command(description = "Unmute a user: [@user|id] [reason].")]
    Mcunmute(String),
    #[command(description = "Ban a user: [@user|id] [duration] [reason].")]
    Mcban(String),
    #[command(description = "Unban a user: [@user|id] [reason].")]
    Mcunban(String),
    #[command(description = "Remove a user from the group: [@user|id] [reason].")]
    Mckick(String),
    #[command(description = "Show the sanction history: [page].")]
    Mclist(String),
}
