//! Bulk writes: many independent single-document operations submitted in
//! one store call, with one result per input item.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::{encode, DocumentRepository};
use crate::document::Document;
use crate::error::RepositoryError;
use crate::guard::DeletionGuard;
use crate::messages::MessageKey;
use crate::results::{InsertResult, UpdatedResult};
use crate::store::{BulkOperation, BulkResponse, DocumentStore, Mutation};

impl<D, S, G> DocumentRepository<D, S, G>
where
    D: Document,
    S: DocumentStore,
    G: DeletionGuard<D>,
{
    /// Create every document in one bulk call.
    ///
    /// Returns one result per input, in input order. An item that could not
    /// be created (e.g. its id already exists) reports `inserted_count == 0`
    /// and never affects the others; no error is raised for it.
    #[instrument(skip_all, fields(collection = %self.collection, count = documents.len()))]
    pub async fn insert_all(
        &self,
        documents: &[D],
        cancel: &CancellationToken,
    ) -> Result<Vec<InsertResult<D>>, RepositoryError> {
        if documents.is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "insert_all needs at least one document".into(),
            ));
        }

        let mut operations = Vec::with_capacity(documents.len());
        for document in documents {
            self.ensure_identified(document)?;
            operations.push(BulkOperation::Create {
                id: document.id(),
                body: encode(document)?,
            });
        }

        let response = self
            .call(cancel, self.store.bulk(&self.collection, operations))
            .await?;
        self.ensure_complete(&response, documents.len())?;

        if response.errors {
            warn!(failed = ?response.failed_ids(), "bulk insert partially failed");
        } else {
            debug!("bulk insert applied");
        }

        // Matched by position: a repeated id in one batch fails only its
        // later occurrences.
        Ok(documents
            .iter()
            .zip(&response.items)
            .map(|(document, item)| {
                let inserted = item.status.is_ok();
                InsertResult {
                    document: document.clone(),
                    inserted_count: u64::from(inserted),
                    message: self.message(if inserted {
                        MessageKey::EntityInserted
                    } else {
                        MessageKey::EntityNotInserted
                    }),
                }
            })
            .collect())
    }

    /// Conditionally update every document in one bulk call.
    ///
    /// Each item is versioned exactly as `update` would do it. If the store
    /// reports any failed item the whole call fails with
    /// `ConcurrencyConflict` listing the failed ids; items that did apply
    /// stay applied, so callers must re-read before retrying.
    #[instrument(skip_all, fields(collection = %self.collection, count = documents.len()))]
    pub async fn update_all(
        &self,
        documents: &[D],
        cancel: &CancellationToken,
    ) -> Result<Vec<UpdatedResult<D>>, RepositoryError> {
        if documents.is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "update_all needs at least one document".into(),
            ));
        }

        let now = Utc::now();
        let mut next = Vec::with_capacity(documents.len());
        let mut operations = Vec::with_capacity(documents.len());
        for document in documents {
            self.ensure_identified(document)?;
            let revised = document.with_meta(document.meta().advance(now));
            operations.push(BulkOperation::Update {
                id: document.id(),
                expected: document.version(),
                mutation: Mutation::Replace(encode(&revised)?),
            });
            next.push(revised);
        }

        let response = self
            .call(cancel, self.store.bulk(&self.collection, operations))
            .await?;
        self.ensure_complete(&response, documents.len())?;

        // Design smell, preserved: one failed item fails the whole call,
        // though items are conditioned independently and applied ones stay
        // applied. Do not turn this into per-item reporting like `insert_all`.
        if response.errors {
            let failed = response.failed_ids();
            warn!(failed = ?failed, "bulk update conflicted");
            return Err(RepositoryError::ConcurrencyConflict {
                collection: self.collection.clone(),
                ids: failed,
            });
        }

        debug!("bulk update applied");
        Ok(next
            .into_iter()
            .zip(&response.items)
            .map(|(document, item)| {
                let updated = item.status.is_ok();
                UpdatedResult {
                    document,
                    updated_count: u64::from(updated),
                    message: self.message(if updated {
                        MessageKey::EntityUpdated
                    } else {
                        MessageKey::EntityNotUpdated
                    }),
                }
            })
            .collect())
    }

    /// A bulk response must account for every submitted item.
    fn ensure_complete(
        &self,
        response: &BulkResponse,
        submitted: usize,
    ) -> Result<(), RepositoryError> {
        if response.items.len() != submitted {
            return Err(RepositoryError::StoreUnavailable(format!(
                "bulk response for {} has {} items for {} operations",
                self.collection,
                response.items.len(),
                submitted
            )));
        }
        Ok(())
    }
}
