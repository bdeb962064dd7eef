//! Database Schema Management
//!
//! Provides schema initialization for catalogd.
//!
//! This is idempotent - safe to call on every boot (the server does this
//! itself, and the standalone `catalogd-migrate` binary calls the same
//! function to run migrations without booting the HTTP server).

use sqlx::{Pool, Sqlite};
use tracing::info;

/// Initializes all database tables, creating them if they don't exist.
pub async fn initialize_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    info!("Initializing database schema");

    // 1. Create Jobs Table (catalog ingest / bulk-delete job records)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            kind TEXT NOT NULL,
            status TEXT NOT NULL,
            total_rows INTEGER,
            processed_rows INTEGER NOT NULL DEFAULT 0,
            error_message TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_kind_created ON jobs(kind, created_at)")
        .execute(pool)
        .await?;

    // 2. Create Products Table (catalog products, upserted by SKU)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sku TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_products_sku_lower ON products(lower(sku))")
        .execute(pool)
        .await?;

    // 3. Create Webhook Subscriptions Table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS webhook_subscriptions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL,
            events TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .execute(pool)
    .await?;

    // 4. Create Webhook Deliveries Table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS webhook_deliveries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            webhook_id INTEGER NOT NULL,
            event_type TEXT NOT NULL,
            payload TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            response_code INTEGER,
            response_body TEXT,
            response_time_ms INTEGER,
            attempted_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            completed_at DATETIME,
            FOREIGN KEY(webhook_id) REFERENCES webhook_subscriptions(id) ON DELETE CASCADE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_webhook_deliveries_webhook_id ON webhook_deliveries(webhook_id, attempted_at)")
        .execute(pool)
        .await?;

    info!("Database schema initialized successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_initialize_schema() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        initialize_schema(&pool)
            .await
            .expect("Failed to initialize schema");

        for table in ["jobs", "products", "webhook_subscriptions", "webhook_deliveries"] {
            let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?")
                .bind(table)
                .fetch_one(&pool)
                .await
                .unwrap_or_else(|_| panic!("failed to check {table} table"));
            assert_eq!(result.0, 1, "{table} table should exist");
        }
    }

    #[tokio::test]
    async fn test_idempotent_schema_initialization() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        initialize_schema(&pool)
            .await
            .expect("First initialization failed");
        initialize_schema(&pool)
            .await
            .expect("Second initialization should be idempotent");
    }
}
