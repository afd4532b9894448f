use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque revision token of a stored document.
///
/// A fresh random 128-bit value is minted on every successful mutation.
/// Tokens detect any divergence, not recency: two tokens are either the same
/// revision or not, and nothing can be said about which one is newer. For
/// that reason `Version` deliberately has no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(Uuid);

impl Version {
    /// Mints a new, unguessable token.
    pub fn generate() -> Self {
        Version(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for Version {
    fn from(value: Uuid) -> Self {
        Version(value)
    }
}

impl FromStr for Version {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
