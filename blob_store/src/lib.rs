//! Relational persistence for blob and user records.
//!
//! The pool is built once at startup: a dedicated bootstrap connection
//! creates the database file if absent and ensures the schema, then the
//! bounded application pool is opened. All consistency (identifier
//! uniqueness, atomic partial updates) is delegated to the backend at
//! statement granularity; there are no multi-statement transactions.

mod error;
mod models;
mod schema;
mod store;
mod users;

pub use error::{Result, StoreError};
pub use models::{BlobContent, BlobMetadata, BlobPatch, NewBlob, User};
pub use schema::initialize_database;
pub use store::BlobStore;
pub use users::UserStore;

use std::{env, path::Path, str::FromStr, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = env::current_dir()
            .unwrap()
            .join("blob_storage/blobs.db")
            .to_str()
            .unwrap()
            .to_string();
        DatabaseConfig {
            path,
            max_connections: 10,
        }
    }
}

fn connect_options(db_path: &Path) -> std::result::Result<SqliteConnectOptions, sqlx::Error> {
    SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display())).map(
        |opts| {
            opts.create_if_missing(true)
                .busy_timeout(Duration::from_secs(5))
                .journal_mode(SqliteJournalMode::Wal)
        },
    )
}

/// Create the database if absent, ensure the schema, and return the
/// bounded application pool.
///
/// Schema setup runs on a dedicated single-connection pool that is closed
/// before the application pool is created, so every application connection
/// is opened against the final schema. A failure here is fatal to startup.
pub async fn create_pool(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let db_path = Path::new(&config.path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("error creating database directory {}", parent.display()))?;
    }

    let bootstrap_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options(db_path)?)
        .await
        .with_context(|| format!("error opening database at {}", config.path))?;
    initialize_database(&bootstrap_pool)
        .await
        .context("error ensuring database schema")?;
    bootstrap_pool.close().await;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options(db_path)?)
        .await
        .with_context(|| format!("error opening database at {}", config.path))?;

    tracing::info!("database ready at {}", config.path);
    Ok(pool)
}
