//! DocumentRepository - typed CRUD over a document store with optimistic
//! concurrency control on every mutation.
//!
//! ## Example
//!
//! ```ignore
//! use occ_repository::{DocumentsExt, InMemoryDocumentStore};
//! use tokio_util::sync::CancellationToken;
//!
//! let store = InMemoryDocumentStore::new();
//! let invoices = store.documents::<Invoice>();
//! let cancel = CancellationToken::new();
//!
//! let inserted = invoices.insert(&invoice, &cancel).await?;
//! let mut current = inserted.document;
//! current.total = 120;
//! let current = invoices.update(&current, &cancel).await?.document;
//! ```

mod bulk;
mod contract;
mod mutation;
mod read;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cancel::run_cancellable;
use crate::config::RepositoryConfig;
use crate::document::Document;
use crate::error::{RepositoryError, StoreError};
use crate::guard::{AllowDeletes, DeletionGuard};
use crate::messages::{DefaultMessages, MessageCatalog, MessageKey};
use crate::store::{CasOutcome, DocumentStore};

pub use contract::Repository;

/// Repository for one document type over a store `S`, with deletion guard `G`.
///
/// Holds no mutable state of its own: all concurrency control happens in the
/// store's per-document conditional scripts, so any number of clones may be
/// used from any number of tasks.
pub struct DocumentRepository<D, S, G = AllowDeletes> {
    store: S,
    guard: G,
    messages: Arc<dyn MessageCatalog>,
    config: RepositoryConfig,
    collection: String,
    _marker: PhantomData<fn() -> D>,
}

impl<D, S: Clone, G: Clone> Clone for DocumentRepository<D, S, G> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            guard: self.guard.clone(),
            messages: Arc::clone(&self.messages),
            config: self.config.clone(),
            collection: self.collection.clone(),
            _marker: PhantomData,
        }
    }
}

impl<D: Document, S: DocumentStore, G> DocumentRepository<D, S, G> {
    /// Repository with default configuration and English messages.
    pub fn new(store: S, guard: G) -> Self {
        let config = RepositoryConfig::default();
        Self {
            collection: config.collection_name(D::COLLECTION),
            store,
            guard,
            messages: Arc::new(DefaultMessages),
            config,
            _marker: PhantomData,
        }
    }

    /// Repository with an explicit configuration. Fails if the configuration
    /// does not validate.
    pub fn with_config(
        store: S,
        guard: G,
        config: RepositoryConfig,
    ) -> Result<Self, RepositoryError> {
        config.validate()?;
        Ok(Self {
            collection: config.collection_name(D::COLLECTION),
            store,
            guard,
            messages: Arc::new(DefaultMessages),
            config,
            _marker: PhantomData,
        })
    }

    /// Replace the message catalog used for result texts.
    pub fn with_messages(mut self, messages: impl MessageCatalog + 'static) -> Self {
        self.messages = Arc::new(messages);
        self
    }

    /// Full collection name, including any configured prefix.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn guard(&self) -> &G {
        &self.guard
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn message(&self, key: MessageKey) -> String {
        self.messages.lookup(key)
    }

    /// Awaits a store call under `cancel`, converting store errors.
    async fn call<T, F>(
        &self,
        cancel: &CancellationToken,
        operation: F,
    ) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        run_cancellable(cancel, async { operation.await.map_err(RepositoryError::from) }).await
    }

    /// A nil id is the "null entity": rejected before any guard or store call.
    fn ensure_identified(&self, document: &D) -> Result<(), RepositoryError> {
        if document.id().is_nil() {
            return Err(RepositoryError::InvalidArgument(format!(
                "{} document has a nil id",
                self.collection
            )));
        }
        Ok(())
    }

    /// Unwraps an applied CAS outcome for `id`; every other outcome becomes
    /// its error.
    fn expect_applied(&self, id: Uuid, outcome: CasOutcome) -> Result<Value, RepositoryError> {
        match outcome {
            CasOutcome::Applied(body) => Ok(body),
            CasOutcome::VersionMismatch => {
                tracing::warn!(collection = %self.collection, %id, "version mismatch");
                Err(RepositoryError::conflict(&self.collection, id))
            }
            CasOutcome::NotFound => Err(RepositoryError::not_found(&self.collection, id)),
            CasOutcome::Rejected(reason) => Err(RepositoryError::InvalidArgument(reason)),
        }
    }
}

pub(crate) fn encode<D: Document>(document: &D) -> Result<Value, RepositoryError> {
    Ok(serde_json::to_value(document)?)
}

pub(crate) fn decode<D: Document>(body: Value) -> Result<D, RepositoryError> {
    Ok(serde_json::from_value(body)?)
}

/// Extension trait for typed document access on any cloneable DocumentStore.
pub trait DocumentsExt: DocumentStore + Clone + Sized {
    /// Get a typed repository that allows every delete.
    fn documents<D: Document>(&self) -> DocumentRepository<D, Self, AllowDeletes> {
        DocumentRepository::new(self.clone(), AllowDeletes::new())
    }

    /// Get a typed repository whose deletes go through `guard`.
    fn guarded_documents<D, G>(&self, guard: G) -> DocumentRepository<D, Self, G>
    where
        D: Document,
        G: DeletionGuard<D>,
    {
        DocumentRepository::new(self.clone(), guard)
    }
}

impl<S: DocumentStore + Clone> DocumentsExt for S {}
