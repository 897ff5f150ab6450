//! Application services - Bot lifecycle and built-in handlers

pub mod command_bot;
pub mod handlers;

pub use command_bot::{BotSettings, BotState, CommandBot, MissingIdentity, DEFAULT_POLL_INTERVAL};
pub use handlers::{reply_registry, HelpHandler, ReplyHandler};
