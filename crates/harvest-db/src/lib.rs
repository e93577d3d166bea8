//! # harvest-db
//!
//! SQLite persistence for farm positions.
//!
//! One table, `positions`, keyed by `(account, item)`. Identifiers are stored
//! as 32-byte BLOBs and amounts as 16-byte big-endian BLOBs, since `u128`
//! does not fit an SQLite integer. The schema version lives in
//! `PRAGMA user_version`.

pub mod migrations;
pub mod queries;
pub mod schema;
pub mod store;

pub use store::SqlitePositionStore;

use std::path::Path;
use std::time::Duration;

use harvest_ledger::StoreError;
use rusqlite::Connection;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 2;

/// Milliseconds a writer waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    /// A stored column could not be decoded.
    #[error("corrupt {column} column: {detail}")]
    Corrupt {
        column: &'static str,
        detail: String,
    },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open or create the position database at `path`, migrating it to
/// [`SCHEMA_VERSION`].
pub fn open(path: &Path) -> Result<Connection> {
    tracing::debug!(path = %path.display(), "opening position database");
    prepare(Connection::open(path)?)
}

/// Open a migrated in-memory database.
pub fn open_memory() -> Result<Connection> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection> {
    // In-memory databases stay in "memory" mode.
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    tracing::trace!(mode, "journal mode set");
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_millis(u64::from(BUSY_TIMEOUT_MS)))?;
    migrations::run(&conn)?;
    Ok(conn)
}
