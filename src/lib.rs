mod cancel;
mod config;
mod document;
mod error;
mod guard;
mod messages;
mod repository;
mod results;
mod store;

pub use config::RepositoryConfig;
pub use document::{
    is_reserved_field, Document, DocumentMeta, Version, CREATED_AT_FIELD, ID_FIELD,
    RESERVED_FIELDS, UPDATED_AT_FIELD, VERSION_FIELD,
};
pub use error::{RepositoryError, StoreError};
pub use guard::{AllowDeletes, DeletionGuard};
pub use messages::{DefaultMessages, MessageCatalog, MessageKey, MessageOverrides};
pub use repository::{DocumentRepository, DocumentsExt, Repository};
pub use results::{
    CanDeleteResult, DeletedResult, IncrementResult, InsertResult, PagedData, PagedRequest,
    UpdatedResult,
};
pub use store::{
    script, BulkItemResponse, BulkItemStatus, BulkOperation, BulkResponse, CasOutcome,
    DocumentStore, InMemoryDocumentStore, Mutation, PutOutcome, SearchHits, SearchQuery,
    SearchRequest,
};

// Derive macro for `Document` (same name, macro namespace)
pub use occ_repository_macros::Document;

// Cancellation tokens appear in every repository signature
pub use tokio_util::sync::CancellationToken;
