//! Deletion guards - per-document-type rules that can veto a delete.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::document::Document;
use crate::error::RepositoryError;
use crate::results::CanDeleteResult;

/// Decides whether a document may be deleted.
///
/// Each repository is built with its own guard, so referential-integrity or
/// business rules stay out of the generic pipeline. The guard runs before
/// every single delete and may do I/O; its verdict is embedded verbatim in
/// the `DeletedResult`. An error from the guard aborts the delete.
///
/// An allow with an empty message gets the repository's `DeletionAllowed`
/// text.
#[async_trait]
pub trait DeletionGuard<D: Document>: Send + Sync {
    async fn can_delete(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<CanDeleteResult, RepositoryError>;
}

/// Guard that allows every delete. Without its own message the verdict text
/// comes from the repository's message catalog.
#[derive(Debug, Clone, Default)]
pub struct AllowDeletes {
    message: Option<String>,
}

impl AllowDeletes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `message` instead of the default "deletion allowed" text.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

#[async_trait]
impl<D: Document> DeletionGuard<D> for AllowDeletes {
    async fn can_delete(
        &self,
        _document: &D,
        _cancel: &CancellationToken,
    ) -> Result<CanDeleteResult, RepositoryError> {
        Ok(CanDeleteResult::allow(self.message.clone().unwrap_or_default()))
    }
}
