use std::sync::Arc;

use corralon_backend::search::CatalogSearch;
use sqlx::SqlitePool;

/// Shared application state handed to every handler.
pub struct AppState {
    pub db: SqlitePool,
    pub search: Arc<CatalogSearch>,
}
