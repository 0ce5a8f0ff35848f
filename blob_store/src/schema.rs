//! Idempotent schema setup.
//!
//! Tables are created if absent at startup; there is no versioned
//! migration machinery beyond that.

use crate::error::Result;
use sqlx::SqlitePool;

/// Ensure every table exists. Safe to run on every startup.
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    tracing::info!("ensuring database schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS image_blobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_name TEXT NOT NULL,
            uuid TEXT NOT NULL UNIQUE,
            image_data BLOB NOT NULL,
            content_type TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
