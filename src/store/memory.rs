//! In-memory catalog store.
//!
//! Backs the engine tests (call counting, failure injection) and small demo
//! deployments that don't want a database file. Semantics mirror the SQLite
//! store: byte-ordered name index, `(name, id)` pagination.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CatalogStore, DimensionField, StoreError};
use crate::models::CatalogItem;

/// Cursor field separator; `\u{1f}` never appears in names or ids.
const CURSOR_SEP: char = '\u{1f}';

#[derive(Default)]
pub struct MemoryCatalogStore {
    items: RwLock<Vec<CatalogItem>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            items: RwLock::new(items),
            ..Self::default()
        }
    }

    pub fn insert(&self, item: CatalogItem) {
        self.items.write().push(item);
    }

    /// Total store invocations across all operations.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// When set, every operation fails as if the backend were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn record_call(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected outage".to_string()));
        }
        Ok(())
    }
}

fn category_matches(item: &CatalogItem, category: Option<&str>) -> bool {
    match category {
        Some(wanted) => item.category.as_deref() == Some(wanted),
        None => true,
    }
}

fn by_name_then_id(a: &CatalogItem, b: &CatalogItem) -> std::cmp::Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn equality_query(
        &self,
        category: Option<&str>,
        fields: &[(DimensionField, f64)],
        limit: usize,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        self.record_call()?;
        let items = self.items.read();
        Ok(items
            .iter()
            .filter(|item| category_matches(item, category))
            .filter(|item| {
                fields
                    .iter()
                    .all(|(field, value)| field.get(item) == Some(*value))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn range_by_name_prefix(
        &self,
        prefix_low: &str,
        prefix_high: &str,
        limit: usize,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        self.record_call()?;
        let items = self.items.read();
        let mut hits: Vec<CatalogItem> = items
            .iter()
            .filter(|item| item.name.as_str() >= prefix_low && item.name.as_str() < prefix_high)
            .cloned()
            .collect();
        hits.sort_by(by_name_then_id);
        hits.truncate(limit);
        Ok(hits)
    }

    async fn scoped_scan(
        &self,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        self.record_call()?;
        let items = self.items.read();
        Ok(items
            .iter()
            .filter(|item| category_matches(item, category))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn paginated_scan(
        &self,
        category: Option<&str>,
        cursor: Option<&str>,
        batch_size: usize,
    ) -> Result<(Vec<CatalogItem>, Option<String>), StoreError> {
        self.record_call()?;
        let items = self.items.read();
        let mut rows: Vec<CatalogItem> = items
            .iter()
            .filter(|item| category_matches(item, category))
            .cloned()
            .collect();
        rows.sort_by(by_name_then_id);

        let start = match cursor {
            Some(cursor) => {
                let (name, id) = cursor
                    .split_once(CURSOR_SEP)
                    .ok_or_else(|| StoreError::BadCursor(cursor.to_string()))?;
                rows.partition_point(|item| {
                    (item.name.as_str(), item.id.as_str()) <= (name, id)
                })
            }
            None => 0,
        };

        let batch: Vec<CatalogItem> = rows.iter().skip(start).take(batch_size).cloned().collect();
        let next_cursor = if start + batch.len() < rows.len() {
            batch
                .last()
                .map(|item| format!("{}{}{}", item.name, CURSOR_SEP, item.id))
        } else {
            None
        };
        Ok((batch, next_cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, category: Option<&str>) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            category: category.map(|c| c.to_string()),
            height: None,
            width: None,
            length: None,
            unit: None,
            price: None,
            stock: None,
        }
    }

    fn seeded() -> MemoryCatalogStore {
        MemoryCatalogStore::with_items(vec![
            item("3", "Tabla Pino", Some("Maderas")),
            item("1", "Clavos 2\"", Some("Ferretería")),
            item("2", "Tabla Eucalipto", Some("Maderas")),
        ])
    }

    #[tokio::test]
    async fn test_range_scan_is_name_ordered() {
        let store = seeded();
        let hits = store
            .range_by_name_prefix("Tabla", "Tabla\u{f8ff}", 10)
            .await
            .unwrap();
        let names: Vec<&str> = hits.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Tabla Eucalipto", "Tabla Pino"]);
    }

    #[tokio::test]
    async fn test_scoped_scan_filters_category() {
        let store = seeded();
        let hits = store.scoped_scan(Some("Maderas"), 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        let all = store.scoped_scan(None, 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_pagination_walks_everything_once() {
        let store = seeded();
        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let (batch, next) = store
                .paginated_scan(None, cursor.as_deref(), 2)
                .await
                .unwrap();
            seen.extend(batch.into_iter().map(|i| i.id));
            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }
        assert_eq!(seen.len(), 3);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_and_counts() {
        let store = seeded();
        store.set_unavailable(true);
        assert!(store.scoped_scan(None, 10).await.is_err());
        assert_eq!(store.call_count(), 1);
    }
}
