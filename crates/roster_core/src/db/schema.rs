//! Fixed `users` table schema.
//!
//! # Responsibility
//! - Create the `users` table on first open.
//! - Refuse databases written by a newer schema.
//!
//! # Invariants
//! - Schema version is mirrored to `PRAGMA user_version`.
//! - A database reporting a newer version is never modified.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Version written to `PRAGMA user_version` once the table exists.
pub const SCHEMA_VERSION: u32 = 1;

const USERS_SCHEMA_SQL: &str = include_str!("sql/users.sql");

/// Creates the `users` table if the database has not been bootstrapped yet.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if current_version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(USERS_SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;
    Ok(())
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
