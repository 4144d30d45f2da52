pub mod bot_commands;
pub mod duration;
pub mod text;
