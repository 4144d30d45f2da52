use anyhow::Result;
use mcmod_core::helpers::bot_commands::Command;
use teloxide::{Bot, types::Message};

use super::handler::{handle_chats, handle_group_only, handle_help};
use crate::dependencies::BotDependencies;

pub async fn answers(
    bot: Bot,
    msg: Message,
    cmd: Command,
    bot_deps: BotDependencies,
) -> Result<()> {
    match cmd {
        Command::Help | Command::Start => handle_help(bot, msg, bot_deps).await?,
        Command::Chats => handle_chats(bot, msg, bot_deps).await?,
        Command::Adgive(_)
        | Command::Adremove(_)
        | Command::Adlogs(_)
        | Command::Mcwarn(_)
        | Command::Mcunwarn(_)
        | Command::Mcmute(_)
        | Command::Mcunmute(_)
        | Command::Mcban(_)
        | Command::Mcunban(_)
        | Command::Mckick(_)
        | Command::Mclist(_) => handle_group_only(bot, msg).await?,
    };
    Ok(())
}
