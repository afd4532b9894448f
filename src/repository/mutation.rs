//! Single-document writes: insert, update, delete, increment.
//!
//! Every conditional write carries the version the caller last observed and
//! only applies if the store still holds that version. A mismatch is always
//! an error, never a zero count, so "someone else changed this" cannot be
//! mistaken for "nothing happened".

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{encode, DocumentRepository};
use crate::cancel::run_cancellable;
use crate::document::{is_reserved_field, Document, Version};
use crate::error::RepositoryError;
use crate::guard::DeletionGuard;
use crate::messages::MessageKey;
use crate::results::{CanDeleteResult, DeletedResult, IncrementResult, InsertResult, UpdatedResult};
use crate::store::{DocumentStore, Mutation, PutOutcome};

impl<D, S, G> DocumentRepository<D, S, G>
where
    D: Document,
    S: DocumentStore,
    G: DeletionGuard<D>,
{
    /// Create `document` as given. Fails with `DuplicateKey` if its id exists.
    #[instrument(skip_all, fields(collection = %self.collection, id = %document.id()))]
    pub async fn insert(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<InsertResult<D>, RepositoryError> {
        self.ensure_identified(document)?;
        let id = document.id();
        let body = encode(document)?;

        let outcome = self
            .call(cancel, self.store.put(&self.collection, id, body, true))
            .await?;

        match outcome {
            PutOutcome::Created | PutOutcome::Replaced => {
                debug!("document inserted");
                Ok(InsertResult {
                    document: document.clone(),
                    inserted_count: 1,
                    message: self.message(MessageKey::EntityInserted),
                })
            }
            PutOutcome::Conflict => {
                warn!("insert rejected: id already exists");
                Err(RepositoryError::DuplicateKey {
                    collection: self.collection.clone(),
                    id,
                })
            }
        }
    }

    /// Replace the stored document if it still has `document`'s version.
    ///
    /// The returned document carries a fresh version and `updated_at`; the
    /// passed-in value is stale from here on.
    #[instrument(skip_all, fields(collection = %self.collection, id = %document.id()))]
    pub async fn update(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<UpdatedResult<D>, RepositoryError> {
        self.ensure_identified(document)?;
        let id = document.id();
        let expected = document.version();
        let next = document.with_meta(document.meta().advance(Utc::now()));
        let body = encode(&next)?;

        let outcome = self
            .call(
                cancel,
                self.store
                    .conditional_update(&self.collection, id, expected, Mutation::Replace(body)),
            )
            .await?;
        self.expect_applied(id, outcome)?;

        debug!(version = %next.version(), "document updated");
        Ok(UpdatedResult {
            document: next,
            updated_count: 1,
            message: self.message(MessageKey::EntityUpdated),
        })
    }

    /// Ask the deletion guard, then remove the document if it still has
    /// `document`'s version. A refusal never reaches the store.
    #[instrument(skip_all, fields(collection = %self.collection, id = %document.id()))]
    pub async fn delete(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<DeletedResult, RepositoryError> {
        self.ensure_identified(document)?;
        let id = document.id();

        let verdict = self.can_delete(document, cancel).await?;
        if !verdict.allowed {
            warn!(message = %verdict.message, "delete refused by guard");
            return Err(RepositoryError::DeletionRefused {
                message: verdict.message,
            });
        }

        let outcome = self
            .call(
                cancel,
                self.store
                    .conditional_delete(&self.collection, id, document.version()),
            )
            .await?;
        self.expect_applied(id, outcome)?;

        debug!("document deleted");
        Ok(DeletedResult {
            can_delete: verdict,
            deleted_count: 1,
        })
    }

    /// Run this repository's deletion guard for `document`. An allow without
    /// text of its own carries the catalog's `DeletionAllowed` message.
    pub async fn can_delete(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<CanDeleteResult, RepositoryError> {
        let mut verdict = run_cancellable(cancel, self.guard.can_delete(document, cancel)).await?;
        if verdict.allowed && verdict.message.is_empty() {
            verdict.message = self.message(MessageKey::DeletionAllowed);
        }
        Ok(verdict)
    }

    /// Add `amount` to the numeric field `field` of the stored document, if
    /// it still has version `expected`. The store mints the next version in
    /// the same atomic step; it is returned in the result.
    #[instrument(skip_all, fields(collection = %self.collection, %id, field = %field))]
    pub async fn increment(
        &self,
        id: Uuid,
        field: &str,
        expected: Version,
        amount: f64,
        cancel: &CancellationToken,
    ) -> Result<IncrementResult, RepositoryError> {
        if id.is_nil() {
            return Err(RepositoryError::InvalidArgument(format!(
                "{} increment needs a non-nil id",
                self.collection
            )));
        }
        if field.is_empty() || is_reserved_field(field) {
            return Err(RepositoryError::InvalidArgument(format!(
                "field `{}` cannot be incremented",
                field
            )));
        }
        if !amount.is_finite() {
            return Err(RepositoryError::InvalidArgument(format!(
                "increment amount {} is not finite",
                amount
            )));
        }

        let version = Version::generate();
        let mutation = Mutation::Increment {
            field: field.to_string(),
            amount,
            version,
            updated_at: Utc::now(),
        };

        let outcome = self
            .call(
                cancel,
                self.store
                    .conditional_update(&self.collection, id, expected, mutation),
            )
            .await?;
        self.expect_applied(id, outcome)?;

        debug!(amount, %version, "field incremented");
        Ok(IncrementResult {
            applied: true,
            version: Some(version),
        })
    }

    /// `increment` by 1.
    pub async fn increment_by_one(
        &self,
        id: Uuid,
        field: &str,
        expected: Version,
        cancel: &CancellationToken,
    ) -> Result<IncrementResult, RepositoryError> {
        self.increment(id, field, expected, 1.0, cancel).await
    }
}
