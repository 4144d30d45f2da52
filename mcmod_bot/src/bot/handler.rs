use anyhow::Result as AnyResult;
use mcmod_core::{
    helpers::bot_commands::Command,
    moderation::dto::Verdict,
    sanctions::{CommandOutcome, command::parse_command},
};
use teloxide::{
    prelude::*,
    types::{Message, ParseMode},
    utils::{command::BotCommands, html},
};

use crate::{dependencies::BotDependencies, utils::to_inbound};

pub async fn handle_group_message(msg: Message, bot_deps: BotDependencies) -> AnyResult<()> {
    let Some(inbound) = to_inbound(&msg) else {
        return Ok(());
    };

    if let Err(e) = bot_deps.directory.observe(
        inbound.chat_id,
        &inbound.chat_title,
        inbound.user_id,
        inbound.username.as_deref(),
    ) {
        log::error!("Failed to update directory for chat {}: {}", inbound.chat_id, e);
    }

    if let Some(text) = inbound.content() {
        if let Some(command) = parse_command(text, Some(&bot_deps.bot_username)) {
            // an edit must not apply a sanction twice
            if inbound.is_edited {
                return Ok(());
            }
            let outcome = bot_deps.sanctions.handle_command(&inbound, &command).await?;
            if let CommandOutcome::Rejected(reason) = &outcome {
                log::info!(
                    "Rejected {:?} in chat {}: {}",
                    command.kind,
                    inbound.chat_id,
                    reason
                );
            }
            return Ok(());
        }
    }

    let verdict = bot_deps.moderation.handle_message(&inbound).await?;
    if !matches!(verdict, Verdict::Ignored(_)) {
        log::debug!(
            "Message {} in chat {}: {:?}",
            inbound.message_id.0,
            inbound.chat_id,
            verdict
        );
    }
    Ok(())
}

pub async fn handle_help(bot: Bot, msg: Message, bot_deps: BotDependencies) -> AnyResult<()> {
    let text = format!(
        "👋 I keep Minecraft chats free of unsolicited ads.\n\n\
         Ads need a permit and must end with <b>{}</b>, one per 24 hours.\n\
         To get a permit, contact {}.\n\
         📜 Rules: {}\n\n{}",
        html::escape(&bot_deps.config.ad_tag),
        html::escape(&bot_deps.config.support_contact),
        html::escape(&bot_deps.config.rules_link),
        html::escape(&Command::descriptions().to_string())
    );
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

pub async fn handle_chats(bot: Bot, msg: Message, bot_deps: BotDependencies) -> AnyResult<()> {
    let is_admin = msg
        .from
        .as_ref()
        .is_some_and(|user| bot_deps.config.is_admin(user.id));
    if !is_admin {
        return Ok(());
    }

    let chats = bot_deps.directory.known_chats()?;
    let text = if chats.is_empty() {
        "I haven't seen any groups yet.".to_string()
    } else {
        let lines = chats
            .iter()
            .map(|chat| {
                format!(
                    "• {} (<code>{}</code>)",
                    html::escape(&chat.title),
                    chat.chat_id
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("💬 <b>Known groups</b> ({}):\n\n{}", chats.len(), lines)
    };
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

pub async fn handle_group_only(bot: Bot, msg: Message) -> AnyResult<()> {
    bot.send_message(
        msg.chat.id,
        "❌ Moderation commands work in groups only. Reply to a member's message there, or give their @username or numeric id.",
    )
    .await?;
    Ok(())
}
