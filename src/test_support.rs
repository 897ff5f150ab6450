//! Test doubles shared by the unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::{Event, User};
use crate::domain::traits::ChatClient;

/// A message sent through `post_message`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    pub channel: String,
    pub message: String,
    pub as_user: bool,
}

/// In-memory client replaying queued event batches
pub struct RecordingClient {
    users: Vec<User>,
    connect_ok: bool,
    batches: Mutex<VecDeque<Vec<Event>>>,
    posted: Mutex<Vec<Posted>>,
    reads: AtomicUsize,
    cancel_when_drained: Option<CancellationToken>,
}

impl RecordingClient {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users,
            connect_ok: true,
            batches: Mutex::new(VecDeque::new()),
            posted: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            cancel_when_drained: None,
        }
    }

    pub fn failing_connect(mut self) -> Self {
        self.connect_ok = false;
        self
    }

    pub fn with_batch(self, batch: Vec<Event>) -> Self {
        self.batches.lock().unwrap().push_back(batch);
        self
    }

    /// Cancel `token` on the first read after every batch was handed out
    pub fn cancel_when_drained(mut self, token: CancellationToken) -> Self {
        self.cancel_when_drained = Some(token);
        self
    }

    pub fn posted(&self) -> Vec<Posted> {
        self.posted.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn connect(&self) -> Result<(), BotError> {
        if self.connect_ok {
            Ok(())
        } else {
            Err(BotError::Connection("invalid token".to_string()))
        }
    }

    async fn read(&self) -> Result<Vec<Event>, BotError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => Ok(batch),
            None => {
                if let Some(token) = &self.cancel_when_drained {
                    token.cancel();
                }
                Ok(Vec::new())
            }
        }
    }

    async fn get_users(&self) -> Result<Vec<User>, BotError> {
        Ok(self.users.clone())
    }

    async fn post_message(&self, channel: &str, message: &str, as_user: bool) -> Result<(), BotError> {
        self.posted.lock().unwrap().push(Posted {
            channel: channel.to_string(),
            message: message.to_string(),
            as_user,
        });
        Ok(())
    }
}

/// Records the channels a handler was invoked with
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    pub fn handler(&self) -> impl Fn(&str) -> Result<(), CommandError> + Send + Sync + 'static {
        let calls = self.0.clone();
        move |channel: &str| {
            calls.lock().unwrap().push(channel.to_string());
            Ok(())
        }
    }

    pub fn channels(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
