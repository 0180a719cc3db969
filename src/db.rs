use anyhow::Result;
use sqlx::SqlitePool;

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS catalog_items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT,
            height REAL,
            width REAL,
            length REAL,
            unit TEXT,
            price REAL,
            stock REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The name index backs the ordered prefix range scans.
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_catalog_items_name ON catalog_items(name)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_catalog_items_category ON catalog_items(category)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_catalog_items_dimensions \
         ON catalog_items(category, height, width, length)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
