use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::traits::CommandHandler;

/// Command registry mapping keywords to handlers.
///
/// Filled before the bot is built; the bot only ever reads it.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous handler for the keyword
    pub fn register<H>(&mut self, keyword: impl Into<String>, handler: H)
    where
        H: CommandHandler + 'static,
    {
        self.commands.insert(keyword.into(), Arc::new(handler));
    }

    pub fn with<H>(mut self, keyword: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler + 'static,
    {
        self.register(keyword, handler);
        self
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.commands.contains_key(keyword)
    }

    pub fn get(&self, keyword: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.commands.get(keyword)
    }

    /// Registered keywords in sorted order
    pub fn commands(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    /// Every registered keyword that is a prefix of `received`, in sorted order
    pub fn matching<'a>(
        &'a self,
        received: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Arc<dyn CommandHandler>)> + 'a {
        self.commands
            .iter()
            .filter(move |(keyword, _)| received.starts_with(keyword.as_str()))
            .map(|(keyword, handler)| (keyword.as_str(), handler))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.commands.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::CommandError;

    fn noop(_channel: &str) -> Result<(), CommandError> {
        Ok(())
    }

    #[test]
    fn test_commands_sorted() {
        let registry = CommandRegistry::new()
            .with("status", noop)
            .with("help", noop)
            .with("deploy", noop);

        assert_eq!(registry.commands(), vec!["deploy", "help", "status"]);
    }

    #[test]
    fn test_register_replaces_duplicate_keyword() {
        let mut registry = CommandRegistry::new();
        registry.register("help", noop);
        registry.register("help", noop);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.commands(), vec!["help"]);
    }

    #[test]
    fn test_matching_is_prefix_based() {
        let registry = CommandRegistry::new()
            .with("help", noop)
            .with("status", noop);

        let matched: Vec<&str> = registry.matching("help me").map(|(k, _)| k).collect();
        assert_eq!(matched, vec!["help"]);

        assert_eq!(registry.matching("hel").count(), 0);
        assert_eq!(registry.matching("ping").count(), 0);
    }

    #[test]
    fn test_matching_returns_every_overlapping_prefix() {
        let registry = CommandRegistry::new()
            .with("help", noop)
            .with("h", noop);

        let matched: Vec<&str> = registry.matching("help me").map(|(k, _)| k).collect();
        assert_eq!(matched, vec!["h", "help"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.commands().is_empty());
        assert_eq!(format!("{:?}", registry), "{}");
    }
}
