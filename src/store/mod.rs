//! Catalog store abstraction.
//!
//! The search cascade is written against the handful of primitives a
//! document-style backend actually offers: equality lookups, ordered prefix
//! range scans on the name index, bounded fetches and cursor pagination.
//! Everything richer than that is synthesized above this trait.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCatalogStore;
pub use sqlite::SqliteCatalogStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::CatalogItem;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed pagination cursor: {0}")]
    BadCursor(String),
}

/// Dimension attribute addressed by an equality lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionField {
    Height,
    Width,
    Length,
}

impl DimensionField {
    /// Column name in the catalog table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::Width => "width",
            Self::Length => "length",
        }
    }

    /// Reads the corresponding attribute off an item.
    pub fn get(self, item: &CatalogItem) -> Option<f64> {
        match self {
            Self::Height => item.height,
            Self::Width => item.width,
            Self::Length => item.length,
        }
    }
}

/// Read-only catalog operations consumed by the search engine.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Equality-constrained lookup, optionally scoped to one category.
    async fn equality_query(
        &self,
        category: Option<&str>,
        fields: &[(DimensionField, f64)],
        limit: usize,
    ) -> Result<Vec<CatalogItem>, StoreError>;

    /// Ordered scan of the name index over `[prefix_low, prefix_high)`.
    async fn range_by_name_prefix(
        &self,
        prefix_low: &str,
        prefix_high: &str,
        limit: usize,
    ) -> Result<Vec<CatalogItem>, StoreError>;

    /// Unordered bounded fetch, optionally restricted to one category.
    async fn scoped_scan(
        &self,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CatalogItem>, StoreError>;

    /// Cursor pagination ordered by `(name, id)`. Returns one batch plus the
    /// cursor for the next, or `None` when the scan is exhausted.
    async fn paginated_scan(
        &self,
        category: Option<&str>,
        cursor: Option<&str>,
        batch_size: usize,
    ) -> Result<(Vec<CatalogItem>, Option<String>), StoreError>;
}
