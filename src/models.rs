use serde::{Deserialize, Serialize};

/// Product record as stored in the catalog.
///
/// The search engine only ever reads items; `id` is the deduplication key and
/// stays stable for the item's lifetime. Dimension fields are only populated
/// for dimensionally described categories (lumber, mostly); everything else
/// leaves them at `None`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    // Retail attributes; passed through to the dashboard unexamined.
    pub unit: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<f64>,
}
