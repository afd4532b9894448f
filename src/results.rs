//! Outcome objects returned by repository calls. None of these are stored.

use serde::{Deserialize, Serialize};

use crate::document::Version;

/// Outcome of a single create.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertResult<D> {
    pub document: D,
    /// 1 when the document was created, 0 otherwise.
    pub inserted_count: u64,
    pub message: String,
}

impl<D> InsertResult<D> {
    pub fn is_inserted(&self) -> bool {
        self.inserted_count > 0
    }
}

/// Outcome of a single conditional update. `document` carries the new
/// version; the caller must drop its previous copy.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatedResult<D> {
    pub document: D,
    /// 1 when the update was applied, 0 otherwise.
    pub updated_count: u64,
    pub message: String,
}

impl<D> UpdatedResult<D> {
    pub fn is_updated(&self) -> bool {
        self.updated_count > 0
    }
}

/// Verdict of a deletion guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanDeleteResult {
    pub allowed: bool,
    pub message: String,
}

impl CanDeleteResult {
    pub fn allow(message: impl Into<String>) -> Self {
        Self {
            allowed: true,
            message: message.into(),
        }
    }

    pub fn deny(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            message: message.into(),
        }
    }
}

/// Outcome of a delete; embeds the guard verdict verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedResult {
    pub can_delete: CanDeleteResult,
    pub deleted_count: u64,
}

/// Outcome of a field increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementResult {
    pub applied: bool,
    /// Version minted by the increment, to be used as the next expected version.
    pub version: Option<Version>,
}

/// Page request. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedRequest {
    pub page: u32,
    pub page_size: u32,
    /// Top-level field to sort by; a leading `-` sorts descending.
    #[serde(default)]
    pub sort: Option<String>,
}

impl PagedRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            sort: None,
        }
    }

    pub fn sorted_by(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Zero-based offset of the first item of this page.
    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of documents plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedData<D> {
    pub items: Vec<D>,
    pub total_count: u64,
}
