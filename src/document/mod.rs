//! Documents - the versioned record shape every repository operates on.
//!
//! A document is any serde type that carries a [`DocumentMeta`] and names the
//! collection it lives in. The meta is flattened into the stored body, so a
//! backend sees `id`, `version`, `created_at` and `updated_at` as top-level
//! fields and can compare versions inside its own atomic scripts.
//!
//! ## Example
//!
//! ```ignore
//! use occ_repository::{Document, DocumentMeta};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize, Document)]
//! #[document(collection = "invoices")]
//! struct Invoice {
//!     #[serde(flatten)]
//!     pub meta: DocumentMeta,
//!     pub total: i64,
//! }
//!
//! let invoice = Invoice { meta: DocumentMeta::new(), total: 0 };
//! ```

mod meta;
mod version;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

pub use meta::DocumentMeta;
pub use version::Version;

/// Body field holding the document id.
pub const ID_FIELD: &str = "id";
/// Body field holding the version token.
pub const VERSION_FIELD: &str = "version";
/// Body field holding the creation timestamp.
pub const CREATED_AT_FIELD: &str = "created_at";
/// Body field holding the last-update timestamp.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Fields owned by [`DocumentMeta`]; field-level scripts may not touch them.
pub const RESERVED_FIELDS: [&str; 4] = [
    ID_FIELD,
    VERSION_FIELD,
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
];

/// Trait for types that can be stored through a repository.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this document type (e.g., "invoices").
    /// Maps to an index in a search engine, a table in SQL, a key prefix in KV stores.
    const COLLECTION: &'static str;

    /// Identity, timestamps and version of this document.
    fn meta(&self) -> &DocumentMeta;

    /// Returns a copy of this document carrying `meta`. The receiver is left untouched.
    fn with_meta(&self, meta: DocumentMeta) -> Self;

    fn id(&self) -> Uuid {
        self.meta().id()
    }

    fn version(&self) -> Version {
        self.meta().version()
    }
}

/// Returns true when `field` is owned by the document meta.
pub fn is_reserved_field(field: &str) -> bool {
    RESERVED_FIELDS.contains(&field)
}
