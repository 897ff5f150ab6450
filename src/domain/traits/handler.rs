use async_trait::async_trait;
use crate::application::errors::CommandError;

/// Command handler - invoked with the channel the command came from
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn invoke(&self, channel: &str) -> Result<(), CommandError>;
}

#[async_trait]
impl<F> CommandHandler for F
where
    F: Fn(&str) -> Result<(), CommandError> + Send + Sync,
{
    async fn invoke(&self, channel: &str) -> Result<(), CommandError> {
        (self)(channel)
    }
}
