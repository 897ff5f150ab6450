//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::services::{BotSettings, MissingIdentity};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    /// Command keyword -> reply text
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub on_missing_identity: MissingIdentity,
}

/// Console adapter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    /// Channel that typed lines are posted in
    pub channel: String,
    /// Name of the person typing
    pub user: String,
    /// Additional users present in the listing
    #[serde(default)]
    pub users: Vec<String>,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            channel: "console".to_string(),
            user: "you".to_string(),
            users: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("ping".to_string(), "pong".to_string());
        commands.insert("status".to_string(), "All systems nominal.".to_string());

        Self {
            bot: BotConfig {
                name: "bot".to_string(),
                poll_interval_ms: default_poll_interval_ms(),
                on_missing_identity: MissingIdentity::Fail,
            },
            commands,
            console: ConsoleConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Apply `BOT_NAME` and `BOT_POLL_INTERVAL_MS` overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("BOT_NAME").filter(|n| !n.trim().is_empty()) {
            self.bot.name = name;
        }

        if let Some(raw) = lookup("BOT_POLL_INTERVAL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.bot.poll_interval_ms = ms,
                _ => tracing::warn!("Ignoring invalid BOT_POLL_INTERVAL_MS: {}", raw),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("bot.name must not be empty".to_string()));
        }
        if self.bot.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue("bot.poll-interval-ms must be positive".to_string()));
        }
        // Keywords are matched lowercased, so `Ping` and `ping` would collide
        let mut seen = BTreeSet::new();
        for keyword in self.commands.keys() {
            let normalized = keyword.trim().to_lowercase();
            if normalized.is_empty() {
                return Err(ConfigError::InvalidValue(format!("empty command keyword '{}'", keyword)));
            }
            if !seen.insert(normalized) {
                return Err(ConfigError::InvalidValue(format!(
                    "command keyword '{}' duplicates another keyword ignoring case",
                    keyword
                )));
            }
        }
        Ok(())
    }

    pub fn bot_settings(&self) -> BotSettings {
        BotSettings::new(self.bot.name.clone())
            .with_poll_interval(Duration::from_millis(self.bot.poll_interval_ms))
            .with_missing_identity(self.bot.on_missing_identity)
    }
}
