//! Store gateway - the document store a repository talks to.
//!
//! Backends only need atomic execution of a script against a single
//! document; there are no multi-document transactions anywhere in this
//! contract. Bodies cross the boundary as JSON with the document meta
//! flattened in, so a backend can read `version` inside its own script.

mod in_memory;
pub mod script;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::document::Version;
use crate::error::StoreError;

pub use in_memory::InMemoryDocumentStore;

/// Outcome of an unconditional `put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    /// An existing document was overwritten (`if_absent == false` only).
    Replaced,
    /// A document with this id already exists (`if_absent == true` only).
    Conflict,
}

/// Body change applied by a conditional update once the version matched.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Replace the whole body. The new body already carries its new version.
    Replace(Value),
    /// Add `amount` to a numeric top-level field, stamping `version` and
    /// `updated_at` in the same step.
    Increment {
        field: String,
        amount: f64,
        version: Version,
        updated_at: DateTime<Utc>,
    },
}

/// Outcome of a conditional update or delete.
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome {
    /// The version matched and the change was applied. Carries the stored
    /// body after the change (or the removed body for deletes).
    Applied(Value),
    /// A document exists but its version differs from the expected one.
    /// Nothing was modified.
    VersionMismatch,
    NotFound,
    /// The script could not run against the stored body (e.g. the target
    /// field is not numeric). Nothing was modified.
    Rejected(String),
}

/// One entry of a bulk submission.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    /// Create if absent.
    Create { id: Uuid, body: Value },
    /// Conditional update, same semantics as `conditional_update`.
    Update {
        id: Uuid,
        expected: Version,
        mutation: Mutation,
    },
}

impl BulkOperation {
    pub fn id(&self) -> Uuid {
        match self {
            BulkOperation::Create { id, .. } | BulkOperation::Update { id, .. } => *id,
        }
    }
}

/// Per-item status in a bulk response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkItemStatus {
    Ok,
    /// Create hit an existing id.
    Conflict,
    VersionMismatch,
    NotFound,
    Rejected(String),
}

impl BulkItemStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, BulkItemStatus::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemResponse {
    pub id: Uuid,
    pub status: BulkItemStatus,
}

/// Response to a bulk submission. `items` has exactly one entry per
/// submitted operation, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResponse {
    pub items: Vec<BulkItemResponse>,
    /// True when at least one item failed.
    pub errors: bool,
}

impl BulkResponse {
    pub fn from_items(items: Vec<BulkItemResponse>) -> Self {
        let errors = items.iter().any(|item| !item.status.is_ok());
        Self { items, errors }
    }

    pub fn failed_ids(&self) -> Vec<Uuid> {
        self.items
            .iter()
            .filter(|item| !item.status.is_ok())
            .map(|item| item.id)
            .collect()
    }
}

/// Which documents a search matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    All,
    /// Exact id match.
    Ids(Vec<Uuid>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: SearchQuery,
    /// Zero-based offset.
    pub from: u64,
    pub size: u64,
    /// Top-level field to sort by; a leading `-` sorts descending. `None`
    /// keeps the store's natural order.
    pub sort: Option<String>,
}

impl SearchRequest {
    pub fn new(query: SearchQuery, from: u64, size: u64) -> Self {
        Self {
            query,
            from,
            size,
            sort: None,
        }
    }
}

/// A page of matching bodies and the total number of matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchHits {
    pub documents: Vec<Value>,
    pub total: u64,
}

/// Abstract document store.
///
/// Every conditional call must read the stored version and apply its change
/// as one atomic step per document, so that of two writers racing with the
/// same expected version at most one observes `Applied`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get a body by id. Returns None if not found.
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// Write a body. With `if_absent` an existing id yields `Conflict` and
    /// nothing is written.
    async fn put(
        &self,
        collection: &str,
        id: Uuid,
        body: Value,
        if_absent: bool,
    ) -> Result<PutOutcome, StoreError>;

    /// Apply `mutation` only if the stored version equals `expected`.
    async fn conditional_update(
        &self,
        collection: &str,
        id: Uuid,
        expected: Version,
        mutation: Mutation,
    ) -> Result<CasOutcome, StoreError>;

    /// Remove the document only if the stored version equals `expected`.
    async fn conditional_delete(
        &self,
        collection: &str,
        id: Uuid,
        expected: Version,
    ) -> Result<CasOutcome, StoreError>;

    /// Submit independent operations together. Items are not atomic with
    /// respect to each other; a failing item never aborts the rest.
    async fn bulk(
        &self,
        collection: &str,
        operations: Vec<BulkOperation>,
    ) -> Result<BulkResponse, StoreError>;

    /// Page through matching bodies.
    async fn search(
        &self,
        collection: &str,
        request: SearchRequest,
    ) -> Result<SearchHits, StoreError>;
}
