use anyhow::Result;
use mcmod_core::helpers::bot_commands::Command;
use teloxide::{
    dispatching::{DpHandlerDescription, HandlerExt, UpdateFilterExt},
    dptree::{self, Handler},
    types::{Message, Update},
};

use crate::bot::{answers::answers, handler::handle_group_message};

pub fn handler_tree() -> Handler<'static, Result<()>, DpHandlerDescription> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    // DM: help, start and the chat list
                    dptree::filter(|msg: Message| msg.chat.is_private())
                        .filter_command::<Command>()
                        .endpoint(answers),
                )
                .branch(
                    dptree::filter(|msg: Message| !msg.chat.is_private())
                        .endpoint(handle_group_message),
                ),
        )
        .branch(
            // Edited messages re-run the full decision tree
            Update::filter_edited_message()
                .filter(|msg: Message| !msg.chat.is_private())
                .endpoint(handle_group_message),
        )
}
