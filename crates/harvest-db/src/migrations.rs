//! Forward-only schema migrations.
//!
//! Each step runs in its own transaction together with the `user_version`
//! bump, so an interrupted upgrade resumes from the last completed step.

use rusqlite::Connection;

use crate::{schema, DbError, Result, SCHEMA_VERSION};

/// Migration steps in order; entry `i` upgrades version `i` to `i + 1`.
const STEPS: &[&str] = &[schema::SCHEMA_V1, schema::SCHEMA_V2];

/// Schema version recorded in the database.
pub fn current_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Bring the database up to [`SCHEMA_VERSION`].
///
/// # Errors
///
/// - [`DbError::Migration`] if the database is newer than this build
pub fn run(conn: &Connection) -> Result<()> {
    let from = current_version(conn)?;
    if from > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "database schema v{from} is newer than supported v{SCHEMA_VERSION}"
        )));
    }

    for version in from..SCHEMA_VERSION {
        let step = step(version)?;
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(step)?;
        tx.pragma_update(None, "user_version", version + 1)?;
        tx.commit()?;
        tracing::info!(from = version, to = version + 1, "position schema migrated");
    }
    Ok(())
}

fn step(version: u32) -> Result<&'static str> {
    usize::try_from(version)
        .ok()
        .and_then(|index| STEPS.get(index))
        .copied()
        .ok_or_else(|| DbError::Migration(format!("no migration from v{version}")))
}
