//! Command dispatcher - Routes command text to registered handlers

use std::sync::Arc;
use crate::domain::entities::CommandRegistry;
use crate::domain::traits::ChatClient;
use crate::application::errors::BotError;

/// Leading sentence of the reply sent for unrecognized commands
pub const UNKNOWN_COMMAND_REPLY: &str = "Not sure what you mean.";

/// Command dispatcher - prefix-matches command text against the registry
pub struct CommandDispatcher<C: ChatClient> {
    registry: CommandRegistry,
    client: Arc<C>,
}

impl<C: ChatClient> CommandDispatcher<C> {
    pub fn new(registry: CommandRegistry, client: Arc<C>) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Registered keywords in sorted order
    pub fn commands(&self) -> Vec<String> {
        self.registry.commands()
    }

    /// Invoke every handler whose keyword is a prefix of `command`.
    ///
    /// Overlapping keywords ("h" and "help" for "help me") each run once, in
    /// sorted order. Falls back to the unknown-command reply when nothing matches.
    pub async fn handle_command(&self, command: &str, channel: &str) -> Result<(), BotError> {
        let mut matched = 0usize;
        for (keyword, handler) in self.registry.matching(command) {
            matched += 1;
            tracing::info!("[{}] command '{}' -> handler '{}'", channel, command, keyword);
            handler.invoke(channel).await?;
        }

        if matched > 1 {
            tracing::debug!("[{}] command '{}' matched {} handlers", channel, command, matched);
        }

        if matched == 0 {
            self.unknown_command(channel).await?;
        }
        Ok(())
    }

    /// Reply with the list of available commands
    pub async fn unknown_command(&self, channel: &str) -> Result<(), BotError> {
        let response = format!(
            "{} Available commands are: {}",
            UNKNOWN_COMMAND_REPLY,
            self.commands().join(", ")
        );
        tracing::debug!("[{}] unknown command, replying with help", channel);
        self.client.post_message(channel, &response, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::CommandError;
    use crate::test_support::{Calls, Posted, RecordingClient};

    fn client() -> Arc<RecordingClient> {
        Arc::new(RecordingClient::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_prefix_match_invokes_handler_once() {
        let help = Calls::default();
        let status = Calls::default();
        let client = client();
        let registry = CommandRegistry::new()
            .with("help", help.handler())
            .with("status", status.handler());
        let dispatcher = CommandDispatcher::new(registry, client.clone());

        dispatcher.handle_command("help me", "C1").await.unwrap();

        assert_eq!(help.channels(), vec!["C1"]);
        assert!(status.channels().is_empty());
        assert!(client.posted().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_prefixes_invoke_all_handlers() {
        let h = Calls::default();
        let help = Calls::default();
        let registry = CommandRegistry::new()
            .with("help", help.handler())
            .with("h", h.handler());
        let dispatcher = CommandDispatcher::new(registry, client());

        dispatcher.handle_command("help me", "C7").await.unwrap();

        assert_eq!(h.channels(), vec!["C7"]);
        assert_eq!(help.channels(), vec!["C7"]);
    }

    #[tokio::test]
    async fn test_unknown_command_posts_fallback() {
        let status = Calls::default();
        let client = client();
        let registry = CommandRegistry::new().with("status", status.handler());
        let dispatcher = CommandDispatcher::new(registry, client.clone());

        dispatcher.handle_command("ping", "C2").await.unwrap();

        assert!(status.channels().is_empty());
        assert_eq!(
            client.posted(),
            vec![Posted {
                channel: "C2".to_string(),
                message: "Not sure what you mean. Available commands are: status".to_string(),
                as_user: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_fallback_lists_commands_sorted() {
        let client = client();
        let registry = CommandRegistry::new()
            .with("status", Calls::default().handler())
            .with("deploy", Calls::default().handler())
            .with("help", Calls::default().handler());
        let dispatcher = CommandDispatcher::new(registry, client.clone());

        dispatcher.unknown_command("C3").await.unwrap();

        let posted = client.posted();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].message.ends_with("Available commands are: deploy, help, status"));
    }

    #[tokio::test]
    async fn test_empty_registry_always_falls_back() {
        let client = client();
        let dispatcher = CommandDispatcher::new(CommandRegistry::new(), client.clone());

        dispatcher.handle_command("help", "C1").await.unwrap();

        let posted = client.posted();
        assert_eq!(posted[0].message, "Not sure what you mean. Available commands are: ");
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let failing = |_: &str| -> Result<(), CommandError> {
            Err(CommandError::ExecutionFailed("boom".to_string()))
        };
        let registry = CommandRegistry::new().with("deploy", failing);
        let dispatcher = CommandDispatcher::new(registry, client());

        let err = dispatcher.handle_command("deploy", "C1").await.unwrap_err();
        assert!(matches!(err, BotError::Command(CommandError::ExecutionFailed(_))));
    }
}
