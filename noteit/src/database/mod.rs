//! Database module
//!
//! Local SQLite note store plus the note model shared by every source.

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::initialize_database;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

const POOL_SIZE: u32 = 5;

fn note_store_options(db_path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
}

/// Open (creating if needed) the note store at `db_path` and migrate it.
///
/// Migrations run over a single connection that is closed before the shared
/// pool opens, so no pooled connection ever sees a half-built schema.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(dir) = db_path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let options = note_store_options(db_path);

    let migrator = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options.clone())
        .await?;
    initialize_database(&migrator).await?;
    migrator.close().await;

    let pool = SqlitePoolOptions::new()
        .max_connections(POOL_SIZE)
        .connect_with(options)
        .await?;

    tracing::info!("Opened note store at {:?}", db_path);
    Ok(pool)
}
