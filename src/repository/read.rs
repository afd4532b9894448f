//! Plain lookups. Nothing here checks versions.

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use super::{decode, DocumentRepository};
use crate::document::Document;
use crate::error::RepositoryError;
use crate::results::{PagedData, PagedRequest};
use crate::store::{DocumentStore, SearchHits, SearchQuery, SearchRequest};

impl<D, S, G> DocumentRepository<D, S, G>
where
    D: Document,
    S: DocumentStore,
{
    /// Get a document by id. Returns None if not found.
    pub async fn single_or_default(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<D>, RepositoryError> {
        let body = self
            .call(cancel, self.store.get(&self.collection, id))
            .await?;
        body.map(decode).transpose()
    }

    /// Get a document by id. Fails with `NotFound` if absent.
    pub async fn single(&self, id: Uuid, cancel: &CancellationToken) -> Result<D, RepositoryError> {
        self.single_or_default(id, cancel)
            .await?
            .ok_or_else(|| RepositoryError::not_found(&self.collection, id))
    }

    /// Any one stored document, or None for an empty collection.
    pub async fn first_or_default(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<D>, RepositoryError> {
        let hits = self
            .search(SearchRequest::new(SearchQuery::All, 0, 1), cancel)
            .await?;
        hits.documents.into_iter().next().map(decode).transpose()
    }

    /// Every document in the collection, read in chunks of `max_page_size`.
    #[instrument(skip_all, fields(collection = %self.collection))]
    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<D>, RepositoryError> {
        let chunk = u64::from(self.config.max_page_size);
        let mut documents = Vec::new();
        let mut from = 0u64;

        loop {
            let hits = self
                .search(SearchRequest::new(SearchQuery::All, from, chunk), cancel)
                .await?;
            let fetched = hits.documents.len() as u64;
            for body in hits.documents {
                documents.push(decode(body)?);
            }
            from += fetched;
            if fetched == 0 || from >= hits.total {
                break;
            }
        }

        Ok(documents)
    }

    /// Documents with exactly these ids. Missing ids are skipped and
    /// repeated ids are returned once.
    pub async fn list_by_ids(
        &self,
        ids: &[Uuid],
        cancel: &CancellationToken,
    ) -> Result<Vec<D>, RepositoryError> {
        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let size = unique.len() as u64;
        let hits = self
            .search(SearchRequest::new(SearchQuery::Ids(unique), 0, size), cancel)
            .await?;
        hits.documents.into_iter().map(decode).collect()
    }

    /// Like `list_by_ids`; `None` entries are ignored rather than rejected.
    pub async fn list_by_optional_ids(
        &self,
        ids: &[Option<Uuid>],
        cancel: &CancellationToken,
    ) -> Result<Vec<D>, RepositoryError> {
        let present: Vec<Uuid> = ids.iter().flatten().copied().collect();
        self.list_by_ids(&present, cancel).await
    }

    /// One page of documents plus the total count, using the store's paging.
    /// A `page_size` of 0 means the configured default page size.
    #[instrument(
        skip_all,
        fields(collection = %self.collection, page = request.page, page_size = request.page_size)
    )]
    pub async fn list_paged(
        &self,
        request: &PagedRequest,
        cancel: &CancellationToken,
    ) -> Result<PagedData<D>, RepositoryError> {
        let request = self.normalize(request)?;

        let mut search = SearchRequest::new(
            SearchQuery::All,
            request.offset(),
            u64::from(request.page_size),
        );
        search.sort = request.sort.clone();

        let hits = self.search(search, cancel).await?;
        let items = hits
            .documents
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<D>, _>>()?;
        Ok(PagedData {
            items,
            total_count: hits.total,
        })
    }

    /// Total number of documents in the collection.
    pub async fn count(&self, cancel: &CancellationToken) -> Result<u64, RepositoryError> {
        let hits = self
            .search(SearchRequest::new(SearchQuery::All, 0, 0), cancel)
            .await?;
        Ok(hits.total)
    }

    async fn search(
        &self,
        request: SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchHits, RepositoryError> {
        self.call(cancel, self.store.search(&self.collection, request)).await
    }

    fn normalize(&self, request: &PagedRequest) -> Result<PagedRequest, RepositoryError> {
        if request.page == 0 {
            return Err(RepositoryError::InvalidArgument("pages start at 1".into()));
        }
        let page_size = match request.page_size {
            0 => self.config.default_page_size,
            size if size > self.config.max_page_size => {
                return Err(RepositoryError::InvalidArgument(format!(
                    "page_size {} exceeds the maximum of {}",
                    size, self.config.max_page_size
                )));
            }
            size => size,
        };
        Ok(PagedRequest {
            page: request.page,
            page_size,
            sort: request.sort.clone(),
        })
    }
}
