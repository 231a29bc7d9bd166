//! User store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the four storage primitives over the `users` table, plus lookup by id.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `put` with `id == 0` allocates a fresh id that was never handed out before.
//! - `put` with an explicit id replaces any existing row (insert-or-replace).
//! - `update` on a missing id affects zero rows and is not an error.
//! - Writes hold the writer mutex and an immediate transaction for the full unit of work.
//! - File-backed stores read through a WAL read pool, so reads never wait on a
//!   pending write; in-memory stores read through the writer connection.

use crate::config::{ConfigError, RosterConfig};
use crate::db::schema::{current_user_version, SCHEMA_VERSION};
use crate::db::{open_db_in_memory, open_db_with_timeout, DbError};
use crate::model::user::{User, UserId, NEW_USER_ID};
use log::{debug, error};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OpenFlags, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

const MAX_READERS: u32 = 4;

const USERS_TABLE: &str = "users";
const USER_COLUMNS: [&str; 4] = ["id", "firstName", "lastName", "age"];

const USER_SELECT_SQL: &str = "SELECT
    id,
    firstName,
    lastName,
    age
FROM users";

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failure raised by store, repository and the async facade.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the version this binary writes.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted to a valid record.
    InvalidData(String),
    /// A previous operation panicked while holding the connection.
    LockPoisoned,
    /// Background worker running the operation did not complete.
    WorkerFailed(String),
    /// Store settings were rejected before any connection was opened.
    Config(ConfigError),
    /// Read pool could not hand out a connection.
    ReadPool(r2d2::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "user store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "user store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "user store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::LockPoisoned => write!(f, "user store connection lock is poisoned"),
            Self::WorkerFailed(message) => write!(f, "user store worker failed: {message}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::ReadPool(err) => write!(f, "user store read pool failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
            Self::LockPoisoned => None,
            Self::WorkerFailed(_) => None,
            Self::Config(err) => Some(err),
            Self::ReadPool(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<ConfigError> for StoreError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(value: r2d2::Error) -> Self {
        Self::ReadPool(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage primitives for user records.
///
/// Implementations must make each call atomic and serializable with respect to
/// the others.
pub trait UserStore {
    /// Inserts a new record (`id == 0`) or replaces the row with `user.id`.
    ///
    /// Returns the persisted record, carrying the assigned id for new records.
    fn put(&self, user: &User) -> StoreResult<User>;
    /// Returns every persisted record. Order is unspecified.
    fn list_all(&self) -> StoreResult<Vec<User>>;
    /// Removes the row with `id`; returns the number of removed rows (0 or 1).
    fn delete_by_id(&self, id: UserId) -> StoreResult<usize>;
    /// Overwrites all fields of the row with `user.id`. Missing rows are left untouched.
    fn update(&self, user: &User) -> StoreResult<()>;
    /// Loads one record by id.
    fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
}

/// SQLite-backed user store.
///
/// Owns its connections; no other component may reach the table directly.
pub struct SqliteUserStore {
    conn: Mutex<Connection>,
    readers: Readers,
}

enum Readers {
    /// Reads share the writer connection (in-memory or caller-supplied connections).
    Writer,
    /// Read-only WAL connections on the same file.
    Pool(Pool<SqliteConnectionManager>),
}

impl SqliteUserStore {
    /// Wraps an already bootstrapped connection.
    ///
    /// Reads and writes share this connection.
    ///
    /// # Errors
    /// - Rejects connections whose schema version differs from this binary's.
    /// - Rejects connections missing the `users` table or one of its columns.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_user_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            readers: Readers::Writer,
        })
    }

    /// Opens (and creates if needed) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_config(&RosterConfig::with_db_path(path.as_ref()))
    }

    /// Opens a store whose data lives only as long as the store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Opens the store described by `config`.
    ///
    /// `db_path = None` selects an in-memory database.
    pub fn from_config(config: &RosterConfig) -> StoreResult<Self> {
        let busy_timeout = config.busy_timeout()?;
        let Some(path) = config.db_path.as_deref() else {
            return Self::try_new(open_db_in_memory()?);
        };

        let store = Self::try_new(open_db_with_timeout(path, busy_timeout)?)?;
        Ok(Self {
            readers: Readers::Pool(build_read_pool(path, busy_timeout)?),
            ..store
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn put_row(&self, user: &User) -> StoreResult<User> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        // NULL id lets SQLite allocate the next AUTOINCREMENT value.
        let explicit_id = (!user.is_new()).then_some(user.id);
        tx.execute(
            "INSERT OR REPLACE INTO users (
                id,
                firstName,
                lastName,
                age
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                explicit_id,
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.age,
            ],
        )?;
        let id = explicit_id.unwrap_or_else(|| tx.last_insert_rowid());
        tx.commit()?;
        Ok(user.with_assigned_id(id))
    }

    fn with_reader<T>(&self, read: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        match &self.readers {
            Readers::Writer => {
                let conn = self.lock()?;
                read(&*conn)
            }
            Readers::Pool(pool) => {
                let conn = pool.get()?;
                read(&*conn)
            }
        }
    }

    fn select_all(&self) -> StoreResult<Vec<User>> {
        self.with_reader(select_all_rows)
    }

    fn select_one(&self, id: UserId) -> StoreResult<Option<User>> {
        self.with_reader(|conn| select_user_row(conn, id))
    }

    fn delete_row(&self, id: UserId) -> StoreResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(removed)
    }

    fn update_row(&self, user: &User) -> StoreResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE users
             SET
                firstName = ?1,
                lastName = ?2,
                age = ?3
             WHERE id = ?4;",
            params![
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.age,
                user.id,
            ],
        )?;
        tx.commit()?;
        Ok(changed)
    }
}

impl UserStore for SqliteUserStore {
    fn put(&self, user: &User) -> StoreResult<User> {
        let started_at = Instant::now();
        let result = self.put_row(user);
        match &result {
            Ok(stored) => debug!(
                "event=user_put module=store status=ok id={} assigned={} duration_ms={}",
                stored.id,
                user.is_new(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("user_put", started_at, err),
        }
        result
    }

    fn list_all(&self) -> StoreResult<Vec<User>> {
        let started_at = Instant::now();
        let result = self.select_all();
        match &result {
            Ok(users) => debug!(
                "event=user_list module=store status=ok rows={} duration_ms={}",
                users.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("user_list", started_at, err),
        }
        result
    }

    fn delete_by_id(&self, id: UserId) -> StoreResult<usize> {
        let started_at = Instant::now();
        let result = self.delete_row(id);
        match &result {
            Ok(removed) => debug!(
                "event=user_delete module=store status=ok id={} rows={} duration_ms={}",
                id,
                removed,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("user_delete", started_at, err),
        }
        result
    }

    fn update(&self, user: &User) -> StoreResult<()> {
        let started_at = Instant::now();
        match self.update_row(user) {
            Ok(changed) => {
                // rows=0 means the id is absent; that is a silent no-op.
                debug!(
                    "event=user_update module=store status=ok id={} rows={} duration_ms={}",
                    user.id,
                    changed,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                log_failure("user_update", started_at, &err);
                Err(err)
            }
        }
    }

    fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let started_at = Instant::now();
        let result = self.select_one(id);
        match &result {
            Ok(user) => debug!(
                "event=user_get module=store status=ok id={} found={} duration_ms={}",
                id,
                user.is_some(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("user_get", started_at, err),
        }
        result
    }
}

fn build_read_pool(
    path: &Path,
    busy_timeout: Duration,
) -> StoreResult<Pool<SqliteConnectionManager>> {
    let manager = SqliteConnectionManager::file(path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
        .with_init(move |conn| conn.busy_timeout(busy_timeout));
    let pool = Pool::builder()
        .max_size(MAX_READERS)
        .min_idle(Some(1))
        .build(manager)?;
    Ok(pool)
}

fn select_all_rows(conn: &Connection) -> StoreResult<Vec<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut users = Vec::new();
    while let Some(row) = rows.next()? {
        users.push(parse_user_row(row)?);
    }
    Ok(users)
}

fn select_user_row(conn: &Connection, id: UserId) -> StoreResult<Option<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_user_row(row)?));
    }

    Ok(None)
}

fn log_failure(event: &str, started_at: Instant, err: &StoreError) {
    error!(
        "event={} module=store status=error duration_ms={} error={}",
        event,
        started_at.elapsed().as_millis(),
        err
    );
}

fn parse_user_row(row: &Row<'_>) -> StoreResult<User> {
    build_user(
        row.get("id")?,
        row.get("firstName")?,
        row.get("lastName")?,
        row.get("age")?,
    )
}

fn build_user(id: UserId, first_name: String, last_name: String, age: i32) -> StoreResult<User> {
    if id == NEW_USER_ID {
        return Err(StoreError::InvalidData(
            "reserved id `0` in users.id".to_string(),
        ));
    }
    Ok(User {
        id,
        first_name,
        last_name,
        age,
    })
}

fn ensure_user_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = SCHEMA_VERSION;
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, USERS_TABLE)? {
        return Err(StoreError::MissingRequiredTable(USERS_TABLE));
    }

    for column in USER_COLUMNS {
        if !table_has_column(conn, USERS_TABLE, column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: USERS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{build_user, StoreError};

    #[test]
    fn build_user_rejects_reserved_id() {
        let err = build_user(0, "Ana".to_string(), "Diaz".to_string(), 30).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn build_user_keeps_store_values_unvalidated() {
        let user = build_user(3, String::new(), "Diaz".to_string(), -1).unwrap();
        assert_eq!(user.id, 3);
        assert!(user.first_name.is_empty());
        assert_eq!(user.age, -1);
    }
}
