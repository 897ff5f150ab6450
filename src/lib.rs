//! Chat bot that answers commands addressed to it by mention.
//!
//! A [`CommandBot`] polls a [`ChatClient`] for events, picks the first one
//! that mentions the bot as `<@ID>`, and runs every registered handler whose
//! keyword is a prefix of the text after the mention.

pub mod domain;
pub mod application;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_support;

pub use application::errors::{BotError, CommandError, ConfigError};
pub use application::services::{BotSettings, BotState, CommandBot, MissingIdentity};
pub use domain::entities::{CommandRegistry, Event, User};
pub use domain::traits::{ChatClient, CommandHandler};
