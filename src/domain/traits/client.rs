use async_trait::async_trait;
use crate::domain::entities::{Event, User};
use crate::application::errors::BotError;

/// Chat client - abstraction over the messaging backend
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Establish the backend connection
    async fn connect(&self) -> Result<(), BotError>;

    /// Fetch the events received since the last call, possibly none
    async fn read(&self) -> Result<Vec<Event>, BotError>;

    /// List the backend's users
    async fn get_users(&self) -> Result<Vec<User>, BotError>;

    /// Send a message to a channel
    ///
    /// `as_user` is passed through to the backend unchanged.
    async fn post_message(&self, channel: &str, message: &str, as_user: bool) -> Result<(), BotError>;
}
