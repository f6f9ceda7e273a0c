//! # Schema Migrations
//!
//! The SQL under `migrations/sqlite/` is compiled into the binary, so a
//! fresh `procura` install creates its schema on first start with no
//! separate setup step. `_sqlx_migrations` records what has been applied;
//! opening an up-to-date file costs one query.
//!
//! `001_initial_schema.sql` creates the two contract registers (`contracts`
//! for infrastructure, `goods` for goods and services) plus `contractors`
//! and `settings`. The registers share one column layout and must be
//! altered together. Applied files are never edited; changes go in a new
//! `NNN_description.sql`.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies whatever the file is missing. Called on every start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.migrations.len(), "schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts. `applied` is 0 on a file that
/// has never been migrated.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    // Table is absent until the first run
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
