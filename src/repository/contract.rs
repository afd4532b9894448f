use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::DocumentRepository;
use crate::document::{Document, Version};
use crate::error::RepositoryError;
use crate::guard::DeletionGuard;
use crate::results::{
    CanDeleteResult, DeletedResult, IncrementResult, InsertResult, PagedData, PagedRequest,
    UpdatedResult,
};
use crate::store::DocumentStore;

/// Object-safe repository surface for one document type.
///
/// Lets callers hold a `Box<dyn Repository<D>>` without naming the store
/// or guard. `DocumentRepository` implements it by delegation.
#[async_trait]
pub trait Repository<D: Document>: Send + Sync {
    async fn can_delete(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<CanDeleteResult, RepositoryError>;

    async fn delete(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<DeletedResult, RepositoryError>;

    async fn insert(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<InsertResult<D>, RepositoryError>;

    async fn insert_all(
        &self,
        documents: &[D],
        cancel: &CancellationToken,
    ) -> Result<Vec<InsertResult<D>>, RepositoryError>;

    async fn update(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<UpdatedResult<D>, RepositoryError>;

    async fn update_all(
        &self,
        documents: &[D],
        cancel: &CancellationToken,
    ) -> Result<Vec<UpdatedResult<D>>, RepositoryError>;

    async fn increment(
        &self,
        id: Uuid,
        field: &str,
        expected: Version,
        amount: f64,
        cancel: &CancellationToken,
    ) -> Result<IncrementResult, RepositoryError>;

    async fn first_or_default(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<D>, RepositoryError>;

    async fn single_or_default(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<D>, RepositoryError>;

    async fn single(&self, id: Uuid, cancel: &CancellationToken) -> Result<D, RepositoryError>;

    async fn list(&self, cancel: &CancellationToken) -> Result<Vec<D>, RepositoryError>;

    async fn list_by_ids(
        &self,
        ids: &[Uuid],
        cancel: &CancellationToken,
    ) -> Result<Vec<D>, RepositoryError>;

    async fn list_by_optional_ids(
        &self,
        ids: &[Option<Uuid>],
        cancel: &CancellationToken,
    ) -> Result<Vec<D>, RepositoryError>;

    async fn list_paged(
        &self,
        request: &PagedRequest,
        cancel: &CancellationToken,
    ) -> Result<PagedData<D>, RepositoryError>;

    async fn count(&self, cancel: &CancellationToken) -> Result<u64, RepositoryError>;
}

#[async_trait]
impl<D, S, G> Repository<D> for DocumentRepository<D, S, G>
where
    D: Document,
    S: DocumentStore,
    G: DeletionGuard<D>,
{
    async fn can_delete(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<CanDeleteResult, RepositoryError> {
        DocumentRepository::can_delete(self, document, cancel).await
    }

    async fn delete(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<DeletedResult, RepositoryError> {
        DocumentRepository::delete(self, document, cancel).await
    }

    async fn insert(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<InsertResult<D>, RepositoryError> {
        DocumentRepository::insert(self, document, cancel).await
    }

    async fn insert_all(
        &self,
        documents: &[D],
        cancel: &CancellationToken,
    ) -> Result<Vec<InsertResult<D>>, RepositoryError> {
        DocumentRepository::insert_all(self, documents, cancel).await
    }

    async fn update(
        &self,
        document: &D,
        cancel: &CancellationToken,
    ) -> Result<UpdatedResult<D>, RepositoryError> {
        DocumentRepository::update(self, document, cancel).await
    }

    async fn update_all(
        &self,
        documents: &[D],
        cancel: &CancellationToken,
    ) -> Result<Vec<UpdatedResult<D>>, RepositoryError> {
        DocumentRepository::update_all(self, documents, cancel).await
    }

    async fn increment(
        &self,
        id: Uuid,
        field: &str,
        expected: Version,
        amount: f64,
        cancel: &CancellationToken,
    ) -> Result<IncrementResult, RepositoryError> {
        DocumentRepository::increment(self, id, field, expected, amount, cancel).await
    }

    async fn first_or_default(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<D>, RepositoryError> {
        DocumentRepository::first_or_default(self, cancel).await
    }

    async fn single_or_default(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<D>, RepositoryError> {
        DocumentRepository::single_or_default(self, id, cancel).await
    }

    async fn single(&self, id: Uuid, cancel: &CancellationToken) -> Result<D, RepositoryError> {
        DocumentRepository::single(self, id, cancel).await
    }

    async fn list(&self, cancel: &CancellationToken) -> Result<Vec<D>, RepositoryError> {
        DocumentRepository::list(self, cancel).await
    }

    async fn list_by_ids(
        &self,
        ids: &[Uuid],
        cancel: &CancellationToken,
    ) -> Result<Vec<D>, RepositoryError> {
        DocumentRepository::list_by_ids(self, ids, cancel).await
    }

    async fn list_by_optional_ids(
        &self,
        ids: &[Option<Uuid>],
        cancel: &CancellationToken,
    ) -> Result<Vec<D>, RepositoryError> {
        DocumentRepository::list_by_optional_ids(self, ids, cancel).await
    }

    async fn list_paged(
        &self,
        request: &PagedRequest,
        cancel: &CancellationToken,
    ) -> Result<PagedData<D>, RepositoryError> {
        DocumentRepository::list_paged(self, request, cancel).await
    }

    async fn count(&self, cancel: &CancellationToken) -> Result<u64, RepositoryError> {
        DocumentRepository::count(self, cancel).await
    }
}
