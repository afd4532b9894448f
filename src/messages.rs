//! Human-readable texts for result objects.
//!
//! Messages only decorate `InsertResult`, `UpdatedResult` and friends; no
//! repository decision ever depends on them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Keys of every message a repository can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    EntityInserted,
    EntityNotInserted,
    EntityUpdated,
    EntityNotUpdated,
    DeletionAllowed,
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Looks up the text for a message key (localization hook).
pub trait MessageCatalog: Send + Sync {
    fn lookup(&self, key: MessageKey) -> String;
}

/// Built-in English texts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageCatalog for DefaultMessages {
    fn lookup(&self, key: MessageKey) -> String {
        match key {
            MessageKey::EntityInserted => "Entity inserted.",
            MessageKey::EntityNotInserted => "Entity not inserted.",
            MessageKey::EntityUpdated => "Entity updated.",
            MessageKey::EntityNotUpdated => "Entity not updated.",
            MessageKey::DeletionAllowed => "Deletion is allowed.",
        }
        .to_string()
    }
}

/// Caller-supplied texts; keys without an override fall back to
/// [`DefaultMessages`].
///
/// ```ignore
/// let catalog = MessageOverrides::from_json(r#"{"EntityInserted": "Gespeichert."}"#)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageOverrides {
    texts: HashMap<MessageKey, String>,
}

impl MessageOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: MessageKey, text: impl Into<String>) -> Self {
        self.texts.insert(key, text.into());
        self
    }

    /// Parse a JSON object mapping key names to texts.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl MessageCatalog for MessageOverrides {
    fn lookup(&self, key: MessageKey) -> String {
        self.texts
            .get(&key)
            .cloned()
            .unwrap_or_else(|| DefaultMessages.lookup(key))
    }
}
