//! Console adapter for development/testing

use async_trait::async_trait;
use chrono::Utc;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::application::errors::BotError;
use crate::domain::entities::{Event, User};
use crate::domain::traits::ChatClient;
use crate::infrastructure::config::ConsoleConfig;

type Input = Box<dyn AsyncBufRead + Send + Unpin>;
type Output = Box<dyn Write + Send>;

/// Turns typed lines into events
#[derive(Debug, Clone)]
struct LineDecoder {
    channel: String,
    sender_id: String,
    /// `@name` -> `<@ID>`, longest names first
    mentions: Vec<(String, String)>,
}

impl LineDecoder {
    fn new(channel: &str, sender: &User, users: &[User]) -> Self {
        let mut mentions: Vec<(String, String)> = users
            .iter()
            .map(|u| (format!("@{}", u.name), u.mention()))
            .collect();
        mentions.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            channel: channel.to_string(),
            sender_id: sender.id.clone(),
            mentions,
        }
    }

    fn decode(&self, line: &str) -> Option<Event> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if line.starts_with('{') {
            match serde_json::from_str::<Event>(line) {
                Ok(event) => return Some(self.fill_defaults(event)),
                Err(e) => tracing::warn!("Not a valid event, sending as text: {}", e),
            }
        }

        let event = Event::message(self.channel.clone(), self.expand_mentions(line))
            .with_user(self.sender_id.clone())
            .with_ts(now_ts());
        Some(event)
    }

    fn fill_defaults(&self, mut event: Event) -> Event {
        event.channel.get_or_insert_with(|| self.channel.clone());
        event.user.get_or_insert_with(|| self.sender_id.clone());
        event.ts.get_or_insert_with(now_ts);
        event
    }

    fn expand_mentions(&self, line: &str) -> String {
        let mut text = line.to_string();
        for (handle, mention) in &self.mentions {
            text = replace_handle(&text, handle, mention);
        }
        text
    }
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Replace `handle` only where it stands as a whole word, so `ops@bot.example`
/// and `@bottle` are left alone
fn replace_handle(text: &str, handle: &str, mention: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in text.match_indices(handle) {
        let end = start + handle.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        if is_word_char(before) || is_word_char(after) {
            continue;
        }
        out.push_str(&text[last..start]);
        out.push_str(mention);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// Slack-style `seconds.micros` timestamp
fn now_ts() -> String {
    let now = Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

fn generate_user_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("U{}", id[..10].to_uppercase())
}

/// Console chat client for local development.
///
/// Lines read from the input become message events, posts go to the output.
pub struct ConsoleClient {
    bot: User,
    users: Vec<User>,
    decoder: LineDecoder,
    input: Mutex<Option<Input>>,
    output: std::sync::Mutex<Output>,
    events: Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
    connected: AtomicBool,
    close_on_eof: Option<CancellationToken>,
}

impl ConsoleClient {
    pub fn new(bot_name: &str, config: &ConsoleConfig) -> Self {
        let bot = User::new(generate_user_id(), bot_name).as_bot();
        let me = User::new(generate_user_id(), config.user.clone());

        let mut users = vec![bot.clone(), me.clone()];
        for name in &config.users {
            users.push(User::new(generate_user_id(), name.clone()));
        }

        Self {
            decoder: LineDecoder::new(&config.channel, &me, &users),
            bot,
            users,
            input: Mutex::new(Some(Box::new(BufReader::new(tokio::io::stdin())))),
            output: std::sync::Mutex::new(Box::new(std::io::stdout())),
            events: Mutex::new(None),
            connected: AtomicBool::new(false),
            close_on_eof: None,
        }
    }

    /// Read lines from `input` instead of stdin
    pub fn with_input<R>(mut self, input: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        self.input = Mutex::new(Some(Box::new(input)));
        self
    }

    /// Write posted messages to `output` instead of stdout
    pub fn with_output<W>(mut self, output: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.output = std::sync::Mutex::new(Box::new(output));
        self
    }

    /// Cancel `token` once the input is exhausted and every event was read
    pub fn close_on_eof(mut self, token: CancellationToken) -> Self {
        self.close_on_eof = Some(token);
        self
    }

    /// The user the bot runs as
    pub fn bot_user(&self) -> &User {
        &self.bot
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }
}

#[async_trait]
impl ChatClient for ConsoleClient {
    async fn connect(&self) -> Result<(), BotError> {
        if self.connected.load(Ordering::SeqCst) {
            return Ok(());
        }

        let input = self
            .input
            .lock()
            .await
            .take()
            .ok_or_else(|| BotError::Connection("console input already consumed".to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let decoder = self.decoder.clone();

        tokio::spawn(async move {
            let mut lines = input.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(event) = decoder.decode(&line) {
                            if tx.send(event).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) => {
                        tracing::info!("Console input closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Failed to read console input: {}", e);
                        break;
                    }
                }
            }
        });

        *self.events.lock().await = Some(rx);
        self.connected.store(true, Ordering::SeqCst);
        tracing::info!("Console connected as {} ({})", self.bot.name, self.bot.id);
        Ok(())
    }

    async fn read(&self) -> Result<Vec<Event>, BotError> {
        let mut guard = self.events.lock().await;
        let rx = guard
            .as_mut()
            .ok_or_else(|| BotError::Connection("console not connected".to_string()))?;

        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if let Some(token) = &self.close_on_eof {
                        token.cancel();
                    }
                    break;
                }
            }
        }
        Ok(events)
    }

    async fn get_users(&self) -> Result<Vec<User>, BotError> {
        Ok(self.users.clone())
    }

    async fn post_message(&self, channel: &str, message: &str, as_user: bool) -> Result<(), BotError> {
        let sender = if as_user { self.bot.name.as_str() } else { "app" };
        let mut output = self
            .output
            .lock()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?;

        writeln!(output, "[#{}] {}: {}", channel, sender, message)
            .and_then(|_| output.flush())
            .map_err(|e| BotError::Internal(format!("Failed to write output: {}", e)))?;

        tracing::debug!("Posted to {} (as_user: {})", channel, as_user);
        Ok(())
    }
}
