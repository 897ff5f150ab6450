//! Message handling - Mention parsing and command dispatching

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{CommandDispatcher, UNKNOWN_COMMAND_REPLY};
pub use parser::{MentionParser, ParsedCommand};
