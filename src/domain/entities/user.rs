use serde::{Deserialize, Serialize};

/// Represents a user in the backend's user listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_bot: bool,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_bot: false,
        }
    }

    pub fn as_bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// The `<@ID>` form chat backends use to mention this user
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}
