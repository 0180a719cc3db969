use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use corralon_backend::config;
use corralon_backend::db;
use corralon_backend::search::{CatalogSearch, SearchTuning, SystemClock};
use corralon_backend::store::SqliteCatalogStore;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corralon_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration.
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;
    tracing::info!(
        "Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    // Create data directory if not exists.
    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| app_config.get_database_url());

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect(&database_url)
        .await?;

    db::run_migrations(&pool).await?;

    let tuning = SearchTuning {
        dimensional_category: app_config.search.dimensional_category.clone(),
        cache_ttl: Duration::from_secs(app_config.search.cache_ttl_secs),
        cache_capacity: app_config.search.cache_capacity,
        scan_batch_size: app_config.search.scan_batch_size,
        max_scan_batches: app_config.search.max_scan_batches,
    };
    let store = Arc::new(SqliteCatalogStore::new(pool.clone()));
    let search = Arc::new(CatalogSearch::new(store, tuning, Arc::new(SystemClock)));

    let state = Arc::new(AppState { db: pool, search });

    let app = Router::new()
        .route("/api/health", get(api::server::health_check))
        .route("/search", get(api::search::search))
        .route("/api/search", get(api::search::search))
        .route("/api/catalog/stats", get(api::search::catalog_stats))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
