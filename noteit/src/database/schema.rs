//! Database schema and migrations
//!
//! Versioned SQL scripts for the local note store. Each script runs once,
//! inside its own transaction, and is recorded in `schema_migrations`.

use crate::error::Result;
use sqlx::sqlite::SqlitePool;

/// Ordered (version, script) pairs; versions must only grow
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("migrations/001_initial_schema.sql"))];

/// Bring the note store up to the latest schema version
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
        .fetch_one(pool)
        .await?;

    let pending: Vec<_> = MIGRATIONS.iter().filter(|(v, _)| *v > applied).collect();
    if pending.is_empty() {
        tracing::debug!("Note store schema is current (version {})", applied);
        return Ok(());
    }

    for (version, script) in pending {
        run_migration(pool, *version, script).await?;
    }

    Ok(())
}

async fn run_migration(pool: &SqlitePool, version: i64, script: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    let statements = script.split(';').map(str::trim).filter(|s| !s.is_empty());
    for statement in statements {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    sqlx::query("INSERT INTO schema_migrations (version) VALUES (?)")
        .bind(version)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Note store migrated to schema version {}", version);
    Ok(())
}
