use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::application::errors::BotError;
use crate::application::messaging::{CommandDispatcher, MentionParser};
use crate::domain::entities::CommandRegistry;
use crate::domain::traits::ChatClient;

/// Default pause between two reads
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What to do when the bot's name is missing from the user listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingIdentity {
    /// Refuse to build the bot
    #[default]
    Fail,
    /// Log a warning and build a bot that never responds
    Warn,
}

/// Lifecycle of a bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Disconnected,
    Reading,
    Stopped,
}

impl BotState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => BotState::Reading,
            2 => BotState::Stopped,
            _ => BotState::Disconnected,
        }
    }
}

/// Construction settings for a [`CommandBot`]
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub name: String,
    pub poll_interval: Duration,
    pub missing_identity: MissingIdentity,
}

impl BotSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            missing_identity: MissingIdentity::default(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_missing_identity(mut self, policy: MissingIdentity) -> Self {
        self.missing_identity = policy;
        self
    }
}

/// Bot that answers commands addressed to it with `<@ID> command`
pub struct CommandBot<C: ChatClient> {
    name: String,
    identity: Option<String>,
    client: Arc<C>,
    parser: MentionParser,
    dispatcher: CommandDispatcher<C>,
    poll_interval: Duration,
    state: AtomicU8,
    span: Span,
}

impl<C: ChatClient> CommandBot<C> {
    /// Build the bot, resolving its identity from the client's user listing
    pub async fn new(settings: BotSettings, client: Arc<C>, registry: CommandRegistry) -> Result<Self, BotError> {
        let span = tracing::info_span!("bot", name = %settings.name);

        let identity = Self::resolve_identity(&settings.name, client.as_ref())
            .instrument(span.clone())
            .await?;

        if identity.is_none() {
            match settings.missing_identity {
                MissingIdentity::Fail => return Err(BotError::IdentityNotFound(settings.name)),
                MissingIdentity::Warn => span.in_scope(|| {
                    tracing::warn!("No user named '{}', the bot will never be addressed", settings.name);
                }),
            }
        }

        Ok(Self {
            parser: MentionParser::new(identity.as_deref()),
            dispatcher: CommandDispatcher::new(registry, client.clone()),
            name: settings.name,
            identity,
            client,
            poll_interval: settings.poll_interval,
            state: AtomicU8::new(BotState::Disconnected as u8),
            span,
        })
    }

    async fn resolve_identity(name: &str, client: &C) -> Result<Option<String>, BotError> {
        let users = client.get_users().await?;
        tracing::debug!("Resolving identity among {} users", users.len());

        let identity = users.into_iter().find(|u| u.name == name).map(|u| u.id);
        if let Some(id) = &identity {
            tracing::info!("Resolved bot identity: {}", id);
        }
        Ok(identity)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend id of the bot user, if it was found
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// The `<@ID>` marker that addresses this bot
    pub fn mention_marker(&self) -> Option<&str> {
        self.parser.marker()
    }

    /// Registered keywords in sorted order
    pub fn commands(&self) -> Vec<String> {
        self.dispatcher.commands()
    }

    pub fn state(&self) -> BotState {
        BotState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: BotState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    pub async fn handle_command(&self, command: &str, channel: &str) -> Result<(), BotError> {
        self.dispatcher.handle_command(command, channel).await
    }

    /// Connect and keep reading until `cancel` fires.
    ///
    /// A failed connect is returned without reading. Read, post and handler
    /// errors end the loop and are returned as-is.
    pub async fn start(&self, cancel: &CancellationToken) -> Result<(), BotError> {
        async {
            if let Err(e) = self.client.connect().await {
                tracing::error!("Connection failed: {}", e);
                return Err(e);
            }

            self.set_state(BotState::Reading);
            tracing::info!("Connected and running!");

            let result = self.keep_reading(cancel).await;
            self.set_state(BotState::Stopped);

            match &result {
                Ok(()) => tracing::info!("Stopped"),
                Err(e) => tracing::error!("Stopped on error: {}", e),
            }
            result
        }
        .instrument(self.span.clone())
        .await
    }

    async fn keep_reading(&self, cancel: &CancellationToken) -> Result<(), BotError> {
        while !cancel.is_cancelled() {
            let events = self.client.read().await?;

            if let Some(parsed) = self.parser.parse_events(&events) {
                if parsed.is_dispatchable() {
                    self.handle_command(&parsed.command, &parsed.channel).await?;
                } else {
                    tracing::debug!("Ignoring mention without command or channel: {:?}", parsed);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
        Ok(())
    }
}
