//! [`PositionStore`] backed by SQLite.

use std::path::Path;

use harvest_ledger::{PositionStore, StoreError};
use harvest_types::{AccountId, Amount, ItemId, Position};
use rusqlite::Connection;

use crate::queries::positions;
use crate::Result;

/// Position store persisted in a SQLite database.
pub struct SqlitePositionStore {
    conn: Connection,
}

impl SqlitePositionStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(crate::open(path)?))
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Ok(Self::new(crate::open_memory()?))
    }

    /// Wrap an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Sum of all deposited units of `item`.
    pub fn pooled_amount(&self, item: &ItemId) -> Result<Amount> {
        positions::pooled_amount(&self.conn, item)
    }
}

impl PositionStore for SqlitePositionStore {
    fn get(&self, account: &AccountId, item: &ItemId) -> std::result::Result<Position, StoreError> {
        Ok(positions::get(&self.conn, account, item)?.unwrap_or_default())
    }

    fn put(
        &mut self,
        account: &AccountId,
        item: &ItemId,
        position: Position,
    ) -> std::result::Result<(), StoreError> {
        Ok(positions::upsert(&self.conn, account, item, &position)?)
    }

    fn put_many(
        &mut self,
        account: &AccountId,
        positions: &[(ItemId, Position)],
    ) -> std::result::Result<(), StoreError> {
        Ok(positions::upsert_many(&mut self.conn, account, positions)?)
    }

    fn items_held(&self, account: &AccountId) -> std::result::Result<Vec<ItemId>, StoreError> {
        Ok(positions::held_items(&self.conn, account)?)
    }
}
