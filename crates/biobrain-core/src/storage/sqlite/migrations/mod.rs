mod v1_initial;
mod v2_date_added;
mod v3_limitation;

use chrono::Utc;
use rusqlite::Connection;

use super::schema::{create_migrations_table, is_already_exists};
use crate::storage::error::{StoreError, StoreResult};

pub trait Migration {
    fn version(&self) -> u32;
    fn description(&self) -> &'static str;
    fn up(&self, conn: &Connection) -> StoreResult<()>;
}

fn record_migration(conn: &Connection, version: u32) -> StoreResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations(version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![version, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn is_migration_applied(conn: &Connection, version: u32) -> StoreResult<bool> {
    let applied: bool = conn
        .prepare("SELECT 1 FROM schema_migrations WHERE version = ?1")?
        .exists(rusqlite::params![version])?;
    Ok(applied)
}

/// Brings the database up to the latest schema. Idempotent; a structure that
/// already exists counts as applied.
pub fn run_migrations(conn: &Connection) -> StoreResult<()> {
    create_migrations_table(conn)?;

    let migrations: Vec<Box<dyn Migration>> = vec![
        Box::new(v1_initial::V1Initial),
        Box::new(v2_date_added::V2DateAdded),
        Box::new(v3_limitation::V3Limitation),
    ];

    for migration in migrations {
        if is_migration_applied(conn, migration.version())? {
            continue;
        }
        match migration.up(conn) {
            Ok(()) => {}
            Err(StoreError::Database(e)) if is_already_exists(&e) => {
                tracing::debug!(version = migration.version(), "schema already present");
            }
            Err(e) => {
                return Err(StoreError::Migration {
                    version: migration.version(),
                    message: e.to_string(),
                });
            }
        }
        record_migration(conn, migration.version())?;
        tracing::info!(
            version = migration.version(),
            description = migration.description(),
            "applied migration"
        );
    }

    Ok(())
}

pub fn get_applied_versions(conn: &Connection) -> StoreResult<Vec<u32>> {
    let has_table: bool = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='schema_migrations'")?
        .exists([])?;

    if !has_table {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    let mut versions = Vec::new();
    for row in rows {
        versions.push(row?);
    }
    Ok(versions)
}
