//! Mention parser - Finds the event addressed to the bot and extracts its command

use crate::domain::entities::Event;

/// Command text and channel taken from an addressed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: String,
    pub channel: String,
}

impl ParsedCommand {
    /// Both parts are needed before anything can be dispatched
    pub fn is_dispatchable(&self) -> bool {
        !self.command.is_empty() && !self.channel.is_empty()
    }
}

/// Recognizes events that mention the bot as `<@ID>`
#[derive(Debug, Clone)]
pub struct MentionParser {
    marker: Option<String>,
}

impl MentionParser {
    /// Build a parser for the given bot identity.
    ///
    /// Without an identity there is no marker and nothing is ever addressed.
    pub fn new(identity: Option<&str>) -> Self {
        Self {
            marker: identity.map(|id| format!("<@{}>", id)),
        }
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// Whether the event's text contains the mention marker
    pub fn is_addressed(&self, event: &Event) -> bool {
        match (&self.marker, &event.text) {
            (Some(marker), Some(text)) => text.contains(marker.as_str()),
            _ => false,
        }
    }

    /// Parse the first addressed event of a batch; the rest of the batch is dropped
    pub fn parse_events(&self, events: &[Event]) -> Option<ParsedCommand> {
        let marker = self.marker.as_deref()?;
        let event = events.iter().find(|e| self.is_addressed(e))?;
        let text = event.text.as_deref().unwrap_or_default();

        Some(ParsedCommand {
            command: Self::command_text(text, marker),
            channel: event.channel.clone().unwrap_or_default(),
        })
    }

    /// Segment following the first marker, up to the next marker if there is one
    fn command_text(text: &str, marker: &str) -> String {
        text.split(marker)
            .nth(1)
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }
}
