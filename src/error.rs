use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a [`DocumentStore`](crate::DocumentStore) backend itself,
/// as opposed to outcomes of a well-formed request (conflicts, mismatches).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or failed transiently.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A document body could not be encoded or decoded by the store.
    #[error("store serialization error: {0}")]
    Serde(String),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        StoreError::Unavailable(format!("lock poisoned: {}", err))
    }
}

/// Error type for repository operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Null (nil-id) document, empty bulk list, bad paging request or a
    /// field script the store refused to run.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The expected version did not match the stored one. For bulk updates
    /// `ids` lists every item that failed.
    #[error("concurrency conflict on {collection} for {}", join_ids(.ids))]
    ConcurrencyConflict { collection: String, ids: Vec<Uuid> },

    /// The deletion guard refused the delete; carries the guard's message.
    #[error("deletion refused: {message}")]
    DeletionRefused { message: String },

    #[error("document not found: {collection}:{id}")]
    NotFound { collection: String, id: Uuid },

    #[error("duplicate key: {collection}:{id}")]
    DuplicateKey { collection: String, id: Uuid },

    /// Transient or backend failure, surfaced as-is.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("document serialization error: {0}")]
    Serde(String),

    /// The caller's cancellation token fired. The remote effect may or may
    /// not have been applied.
    #[error("operation cancelled")]
    Cancelled,
}

impl RepositoryError {
    pub(crate) fn conflict(collection: &str, id: Uuid) -> Self {
        RepositoryError::ConcurrencyConflict {
            collection: collection.to_string(),
            ids: vec![id],
        }
    }

    pub(crate) fn not_found(collection: &str, id: Uuid) -> Self {
        RepositoryError::NotFound {
            collection: collection.to_string(),
            id,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::ConcurrencyConflict { .. })
    }
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => RepositoryError::StoreUnavailable(msg),
            StoreError::Serde(msg) => RepositoryError::Serde(msg),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serde(err.to_string())
    }
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
