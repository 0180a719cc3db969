//! SQLite-backed catalog store.
//!
//! One `catalog_items` table with a name index; the range scan leans on
//! SQLite's byte-wise TEXT ordering, which matches the byte ordering the
//! engine's prefix sentinel assumes.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{CatalogStore, DimensionField, StoreError};
use crate::models::CatalogItem;

const COLUMNS: &str = "id, name, category, height, width, length, unit, price, stock";

/// Cursor field separator; `\u{1f}` never appears in names or ids.
const CURSOR_SEP: char = '\u{1f}';

pub struct SqliteCatalogStore {
    db: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn equality_query(
        &self,
        category: Option<&str>,
        fields: &[(DimensionField, f64)],
        limit: usize,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        // WHERE clause assembled from a fixed column set only.
        let mut sql = format!("SELECT {} FROM catalog_items WHERE 1=1", COLUMNS);
        if category.is_some() {
            sql.push_str(" AND category = ?");
        }
        for (field, _) in fields {
            sql.push_str(" AND ");
            sql.push_str(field.column());
            sql.push_str(" = ?");
        }
        sql.push_str(" LIMIT ?");

        let mut query = sqlx::query_as::<_, CatalogItem>(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }
        for (_, value) in fields {
            query = query.bind(*value);
        }
        query = query.bind(limit as i64);
        Ok(query.fetch_all(&self.db).await?)
    }

    async fn range_by_name_prefix(
        &self,
        prefix_low: &str,
        prefix_high: &str,
        limit: usize,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        let sql = format!(
            "SELECT {} FROM catalog_items WHERE name >= ? AND name < ? ORDER BY name, id LIMIT ?",
            COLUMNS
        );
        Ok(sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(prefix_low)
            .bind(prefix_high)
            .bind(limit as i64)
            .fetch_all(&self.db)
            .await?)
    }

    async fn scoped_scan(
        &self,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        let rows = match category {
            Some(category) => {
                let sql = format!(
                    "SELECT {} FROM catalog_items WHERE category = ? LIMIT ?",
                    COLUMNS
                );
                sqlx::query_as::<_, CatalogItem>(&sql)
                    .bind(category)
                    .bind(limit as i64)
                    .fetch_all(&self.db)
                    .await?
            }
            None => {
                let sql = format!("SELECT {} FROM catalog_items LIMIT ?", COLUMNS);
                sqlx::query_as::<_, CatalogItem>(&sql)
                    .bind(limit as i64)
                    .fetch_all(&self.db)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn paginated_scan(
        &self,
        category: Option<&str>,
        cursor: Option<&str>,
        batch_size: usize,
    ) -> Result<(Vec<CatalogItem>, Option<String>), StoreError> {
        let mut sql = format!("SELECT {} FROM catalog_items WHERE 1=1", COLUMNS);
        if category.is_some() {
            sql.push_str(" AND category = ?");
        }
        let cursor_pos = match cursor {
            Some(cursor) => {
                let (name, id) = cursor
                    .split_once(CURSOR_SEP)
                    .ok_or_else(|| StoreError::BadCursor(cursor.to_string()))?;
                sql.push_str(" AND (name > ? OR (name = ? AND id > ?))");
                Some((name.to_string(), id.to_string()))
            }
            None => None,
        };
        sql.push_str(" ORDER BY name, id LIMIT ?");

        let mut query = sqlx::query_as::<_, CatalogItem>(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }
        if let Some((name, id)) = &cursor_pos {
            query = query.bind(name.as_str()).bind(name.as_str()).bind(id.as_str());
        }
        query = query.bind(batch_size as i64);

        let batch = query.fetch_all(&self.db).await?;
        // A short batch means the scan is exhausted; a full one may have more.
        let next_cursor = if batch.len() == batch_size {
            batch
                .last()
                .map(|item| format!("{}{}{}", item.name, CURSOR_SEP, item.id))
        } else {
            None
        };
        Ok((batch, next_cursor))
    }
}
