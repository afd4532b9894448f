//! InMemoryDocumentStore - HashMap-backed document store for testing and development.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::script;
use super::{
    BulkItemResponse, BulkItemStatus, BulkOperation, BulkResponse, CasOutcome, DocumentStore,
    Mutation, PutOutcome, SearchHits, SearchQuery, SearchRequest,
};
use crate::document::Version;
use crate::error::StoreError;

/// Internal stored representation of a document.
struct StoredDocument {
    body: Value,
    /// Insertion sequence; gives unsorted searches a stable order.
    seq: u64,
}

type Storage = HashMap<String, StoredDocument>;

/// In-memory document store backed by a HashMap.
///
/// Storage key is `"collection:id"`. Clone-friendly via Arc; clones share
/// storage. Every call holds the write lock for the whole per-document
/// script, which is what makes conditional writes atomic here.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    storage: Arc<RwLock<Storage>>,
    next_seq: Arc<AtomicU64>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(1)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate an outage: while unavailable every call fails with
    /// `StoreError::Unavailable` and nothing is read or written.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of documents stored in `collection`.
    ///
    /// Reads through a poisoned lock: the map itself is never left half
    /// written, so the count stays accurate.
    pub fn len(&self, collection: &str) -> usize {
        let prefix = Self::make_prefix(collection);
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        storage.keys().filter(|k| k.starts_with(&prefix)).count()
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn make_key(collection: &str, id: Uuid) -> String {
        format!("{}:{}", collection, id)
    }

    fn make_prefix(collection: &str) -> String {
        format!("{}:", collection)
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn create_locked(&self, storage: &mut Storage, key: String, body: Value) -> PutOutcome {
        if storage.contains_key(&key) {
            return PutOutcome::Conflict;
        }
        let seq = self.next_seq();
        storage.insert(key, StoredDocument { body, seq });
        PutOutcome::Created
    }

    fn update_locked(
        storage: &mut Storage,
        key: &str,
        expected: Version,
        mutation: &Mutation,
    ) -> CasOutcome {
        let Some(stored) = storage.get_mut(key) else {
            return CasOutcome::NotFound;
        };
        let outcome = script::apply(&stored.body, expected, mutation);
        if let CasOutcome::Applied(body) = &outcome {
            stored.body = body.clone();
        }
        outcome
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        self.ensure_available()?;
        let key = Self::make_key(collection, id);
        let storage = self.storage.read()?;
        Ok(storage.get(&key).map(|stored| stored.body.clone()))
    }

    async fn put(
        &self,
        collection: &str,
        id: Uuid,
        body: Value,
        if_absent: bool,
    ) -> Result<PutOutcome, StoreError> {
        self.ensure_available()?;
        let key = Self::make_key(collection, id);
        let mut storage = self.storage.write()?;

        if if_absent {
            return Ok(self.create_locked(&mut storage, key, body));
        }

        match storage.get_mut(&key) {
            Some(stored) => {
                stored.body = body;
                Ok(PutOutcome::Replaced)
            }
            None => {
                let seq = self.next_seq();
                storage.insert(key, StoredDocument { body, seq });
                Ok(PutOutcome::Created)
            }
        }
    }

    async fn conditional_update(
        &self,
        collection: &str,
        id: Uuid,
        expected: Version,
        mutation: Mutation,
    ) -> Result<CasOutcome, StoreError> {
        self.ensure_available()?;
        let key = Self::make_key(collection, id);
        let mut storage = self.storage.write()?;
        Ok(Self::update_locked(&mut storage, &key, expected, &mutation))
    }

    async fn conditional_delete(
        &self,
        collection: &str,
        id: Uuid,
        expected: Version,
    ) -> Result<CasOutcome, StoreError> {
        self.ensure_available()?;
        let key = Self::make_key(collection, id);
        let mut storage = self.storage.write()?;

        let Some(stored) = storage.get(&key) else {
            return Ok(CasOutcome::NotFound);
        };
        if !script::matches_version(&stored.body, expected) {
            return Ok(CasOutcome::VersionMismatch);
        }
        let removed = storage.remove(&key).map(|s| s.body).unwrap_or(Value::Null);
        Ok(CasOutcome::Applied(removed))
    }

    async fn bulk(
        &self,
        collection: &str,
        operations: Vec<BulkOperation>,
    ) -> Result<BulkResponse, StoreError> {
        self.ensure_available()?;
        let mut storage = self.storage.write()?;
        let mut items = Vec::with_capacity(operations.len());

        for operation in operations {
            let id = operation.id();
            let key = Self::make_key(collection, id);
            let status = match operation {
                BulkOperation::Create { body, .. } => {
                    match self.create_locked(&mut storage, key, body) {
                        PutOutcome::Conflict => BulkItemStatus::Conflict,
                        PutOutcome::Created | PutOutcome::Replaced => BulkItemStatus::Ok,
                    }
                }
                BulkOperation::Update {
                    expected, mutation, ..
                } => match Self::update_locked(&mut storage, &key, expected, &mutation) {
                    CasOutcome::Applied(_) => BulkItemStatus::Ok,
                    CasOutcome::VersionMismatch => BulkItemStatus::VersionMismatch,
                    CasOutcome::NotFound => BulkItemStatus::NotFound,
                    CasOutcome::Rejected(reason) => BulkItemStatus::Rejected(reason),
                },
            };
            items.push(BulkItemResponse { id, status });
        }

        Ok(BulkResponse::from_items(items))
    }

    async fn search(
        &self,
        collection: &str,
        request: SearchRequest,
    ) -> Result<SearchHits, StoreError> {
        self.ensure_available()?;
        let storage = self.storage.read()?;
        let prefix = Self::make_prefix(collection);

        let wanted: Option<HashSet<String>> = match &request.query {
            SearchQuery::All => None,
            SearchQuery::Ids(ids) => Some(
                ids.iter()
                    .map(|id| Self::make_key(collection, *id))
                    .collect(),
            ),
        };

        let mut matches: Vec<&StoredDocument> = storage
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| wanted.as_ref().map_or(true, |w| w.contains(key.as_str())))
            .map(|(_, stored)| stored)
            .collect();

        matches.sort_by_key(|stored| stored.seq);
        if let Some(sort) = request.sort.as_deref() {
            let (field, descending) = match sort.strip_prefix('-') {
                Some(field) => (field, true),
                None => (sort, false),
            };
            // Stable sort: ties keep insertion order.
            matches.sort_by(|a, b| {
                let ordering = compare_json(a.body.get(field), b.body.get(field));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let total = matches.len() as u64;
        let from = usize::try_from(request.from).unwrap_or(usize::MAX);
        let size = usize::try_from(request.size).unwrap_or(usize::MAX);
        let documents = matches
            .into_iter()
            .skip(from)
            .take(size)
            .map(|stored| stored.body.clone())
            .collect();

        Ok(SearchHits { documents, total })
    }
}

/// Orders missing/null values first, then numbers, then strings, then bools.
fn compare_json(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Bool(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
