use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Version;

/// Identity, timestamps and revision of a document.
///
/// Embed it with `#[serde(flatten)]`. Only the mutation pipeline advances the
/// version and `updated_at`; callers get a new value back from every write and
/// must use it for the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    id: Uuid,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    version: Version,
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentMeta {
    /// Fresh meta: random id, random version, `created_at` now, never updated.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Fresh meta for a caller-chosen id.
    pub fn with_id(id: Uuid) -> Self {
        DocumentMeta {
            id,
            created_at: Utc::now(),
            updated_at: None,
            version: Version::generate(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The meta of the next revision: same id and creation time, a new token
    /// and `updated_at` set to `now`.
    pub(crate) fn advance(&self, now: DateTime<Utc>) -> Self {
        DocumentMeta {
            id: self.id,
            created_at: self.created_at,
            updated_at: Some(now),
            version: Version::generate(),
        }
    }
}
