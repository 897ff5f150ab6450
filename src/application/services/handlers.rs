//! Ready-made command handlers

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::CommandRegistry;
use crate::domain::traits::{ChatClient, CommandHandler};

/// Build a registry of canned replies, adding `help` unless a reply already claims it.
///
/// Keywords are lowercased since received commands always are.
pub fn reply_registry<C>(client: Arc<C>, replies: &BTreeMap<String, String>) -> CommandRegistry
where
    C: ChatClient + 'static,
{
    let mut registry = CommandRegistry::new();
    for (keyword, reply) in replies {
        registry.register(keyword.trim().to_lowercase(), ReplyHandler::new(client.clone(), reply.clone()));
    }

    if !registry.contains("help") {
        let mut commands = registry.commands();
        commands.push("help".to_string());
        registry.register("help", HelpHandler::new(client, commands));
    }
    registry
}

/// Posts a fixed text to the channel the command came from
pub struct ReplyHandler<C: ChatClient> {
    client: Arc<C>,
    text: String,
}

impl<C: ChatClient> ReplyHandler<C> {
    pub fn new(client: Arc<C>, text: impl Into<String>) -> Self {
        Self {
            client,
            text: text.into(),
        }
    }
}

#[async_trait]
impl<C: ChatClient> CommandHandler for ReplyHandler<C> {
    async fn invoke(&self, channel: &str) -> Result<(), CommandError> {
        self.client
            .post_message(channel, &self.text, true)
            .await
            .map_err(|e| CommandError::Reply(e.to_string()))
    }
}

/// Lists the available commands
pub struct HelpHandler<C: ChatClient> {
    client: Arc<C>,
    commands: Vec<String>,
}

impl<C: ChatClient> HelpHandler<C> {
    pub fn new(client: Arc<C>, mut commands: Vec<String>) -> Self {
        commands.sort();
        commands.dedup();
        Self { client, commands }
    }

    pub fn text(&self) -> String {
        format!("Available commands are: {}", self.commands.join(", "))
    }
}

#[async_trait]
impl<C: ChatClient> CommandHandler for HelpHandler<C> {
    async fn invoke(&self, channel: &str) -> Result<(), CommandError> {
        self.client
            .post_message(channel, &self.text(), true)
            .await
            .map_err(|e| CommandError::Reply(e.to_string()))
    }
}
