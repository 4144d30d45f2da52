use mcmod_core::moderation::dto::{InboundMessage, ReplyTarget};
use teloxide::types::{Message, User};

fn display_name(user: &User) -> String {
    user.full_name()
}

/// Converts a group message. `None` when there is no sender to act on.
pub fn to_inbound(msg: &Message) -> Option<InboundMessage> {
    let user = msg.from.as_ref()?;
    let reply_to = msg
        .reply_to_message()
        .and_then(|reply| reply.from.as_ref())
        .map(|author| ReplyTarget {
            user_id: author.id,
            username: author.username.clone(),
            display_name: display_name(author),
            is_bot: author.is_bot,
        });

    Some(InboundMessage {
        chat_id: msg.chat.id,
        chat_title: msg.chat.title().unwrap_or_default().to_string(),
        message_id: msg.id,
        user_id: user.id,
        username: user.username.clone(),
        display_name: display_name(user),
        is_bot: user.is_bot,
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        reply_to,
        is_edited: msg.edit_date().is_some(),
    })
}
