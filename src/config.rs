use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 1000;

/// Repository configuration
///
/// Connection settings belong to the store; this only covers how a
/// repository names its collection and pages through results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Prepended to every document collection name (e.g. `"staging_"`).
    pub collection_prefix: Option<String>,

    /// Page size `list_paged` uses when a request asks for a page size of 0.
    pub default_page_size: u32,

    /// Largest page a caller may request; also the chunk size `list` uses
    /// when reading a whole collection.
    pub max_page_size: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            collection_prefix: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl RepositoryConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collection prefix
    pub fn collection_prefix(mut self, prefix: &str) -> Self {
        self.collection_prefix = Some(prefix.to_string());
        self
    }

    /// Set the default page size
    pub fn default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size;
        self
    }

    /// Set the maximum page size
    pub fn max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size;
        self
    }

    /// Parse from JSON; missing fields take their defaults.
    ///
    /// ```ignore
    /// let config = RepositoryConfig::from_json(r#"{"collection_prefix": "staging_"}"#)?;
    /// ```
    pub fn from_json(json: &str) -> Result<Self, RepositoryError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RepositoryError::InvalidArgument(format!("repository config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(RepositoryError::InvalidArgument(
                "page sizes must be at least 1".into(),
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(RepositoryError::InvalidArgument(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }

    /// Full collection name for a document collection.
    pub fn collection_name(&self, collection: &str) -> String {
        match &self.collection_prefix {
            Some(prefix) => format!("{}{}", prefix, collection),
            None => collection.to_string(),
        }
    }
}
