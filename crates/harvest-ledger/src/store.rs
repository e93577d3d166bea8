//! Position storage.
//!
//! [`PositionStore`] is the only way the farm reads or writes positions, so
//! any backing store (in-memory map, SQLite table) can be substituted without
//! touching the operations. Unseen keys read as an empty position.

use std::collections::BTreeMap;

use harvest_types::{AccountId, ItemId, Position};

use crate::StoreError;

/// Storage contract for `(account, item)` positions.
pub trait PositionStore {
    /// Position of `account` in `item`; empty if never written.
    fn get(&self, account: &AccountId, item: &ItemId) -> Result<Position, StoreError>;

    /// Replace the position of `account` in `item`.
    fn put(&mut self, account: &AccountId, item: &ItemId, position: Position)
        -> Result<(), StoreError>;

    /// Replace several positions of `account` at once.
    ///
    /// Either every write lands or none does.
    fn put_many(
        &mut self,
        account: &AccountId,
        positions: &[(ItemId, Position)],
    ) -> Result<(), StoreError>;

    /// Items in which `account` currently holds a non-zero amount.
    fn items_held(&self, account: &AccountId) -> Result<Vec<ItemId>, StoreError>;
}

/// In-memory position store.
#[derive(Clone, Debug, Default)]
pub struct MemoryPositionStore {
    positions: BTreeMap<(AccountId, ItemId), Position>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, including emptied ones.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl PositionStore for MemoryPositionStore {
    fn get(&self, account: &AccountId, item: &ItemId) -> Result<Position, StoreError> {
        Ok(self
            .positions
            .get(&(*account, *item))
            .copied()
            .unwrap_or_default())
    }

    fn put(
        &mut self,
        account: &AccountId,
        item: &ItemId,
        position: Position,
    ) -> Result<(), StoreError> {
        self.positions.insert((*account, *item), position);
        Ok(())
    }

    fn put_many(
        &mut self,
        account: &AccountId,
        positions: &[(ItemId, Position)],
    ) -> Result<(), StoreError> {
        for (item, position) in positions {
            self.positions.insert((*account, *item), *position);
        }
        Ok(())
    }

    fn items_held(&self, account: &AccountId) -> Result<Vec<ItemId>, StoreError> {
        let lo = (*account, ItemId([0x00; 32]));
        let hi = (*account, ItemId([0xFF; 32]));
        Ok(self
            .positions
            .range(lo..=hi)
            .filter(|(_, position)| !position.is_empty())
            .map(|((_, item), _)| *item)
            .collect())
    }
}
