//! Immutable per-item reward rates.
//!
//! A rate is the number of reward units earned per block per deposited unit.
//! The table is fixed at construction; nothing can change it afterwards.

use std::collections::btree_map::{self, BTreeMap};

use harvest_crypto::blake3;
use harvest_types::{Amount, ItemId};

use crate::{FarmError, Result};

/// Mapping from item identifier to reward rate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<ItemId, Amount>,
}

impl RateTable {
    /// Build a table from `(item, rate)` pairs.
    ///
    /// # Errors
    ///
    /// - [`FarmError::UnknownConfiguration`] if an item appears twice
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ItemId, Amount)>,
    {
        let mut rates = BTreeMap::new();
        for (item, rate) in entries {
            if rates.insert(item, rate).is_some() {
                return Err(FarmError::UnknownConfiguration(format!(
                    "duplicate rate entry for item {item}"
                )));
            }
        }
        Ok(Self { rates })
    }

    /// Build a table from `(name, rate)` pairs, deriving item identifiers
    /// from the names.
    ///
    /// # Errors
    ///
    /// - [`FarmError::UnknownConfiguration`] if a name is empty or repeated
    pub fn from_named<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Amount)>,
    {
        let mut rates = BTreeMap::new();
        for (name, rate) in entries {
            if name.trim().is_empty() {
                return Err(FarmError::UnknownConfiguration(
                    "item name must not be empty".to_string(),
                ));
            }
            if rates.insert(blake3::item_id(name), rate).is_some() {
                return Err(FarmError::UnknownConfiguration(format!(
                    "duplicate rate entry for item '{name}'"
                )));
            }
        }
        Ok(Self { rates })
    }

    /// Reward rate of `item`, or zero if the item is not registered.
    pub fn rate_of(&self, item: &ItemId) -> Amount {
        self.get(item).unwrap_or(0)
    }

    /// Reward rate of `item`, if registered.
    pub fn get(&self, item: &ItemId) -> Option<Amount> {
        self.rates.get(item).copied()
    }

    /// Whether `item` is registered.
    pub fn contains(&self, item: &ItemId) -> bool {
        self.rates.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Registered items and their rates, ordered by item identifier.
    pub fn iter(&self) -> btree_map::Iter<'_, ItemId, Amount> {
        self.rates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_of_registered() {
        let table = RateTable::from_named([("Grin", 7), ("Honeycomb", 300)]).expect("table");
        assert_eq!(table.rate_of(&blake3::item_id("Grin")), 7);
        assert_eq!(table.rate_of(&blake3::item_id("Honeycomb")), 300);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unknown_item_is_zero_rate() {
        let table = RateTable::from_named([("Grin", 7)]).expect("table");
        let unknown = blake3::item_id("Bottomless Elixir");
        assert_eq!(table.rate_of(&unknown), 0);
        assert!(!table.contains(&unknown));
        assert_eq!(table.get(&unknown), None);
    }

    #[test]
    fn test_zero_rate_item_is_known() {
        let table = RateTable::from_named([("Dirt", 0)]).expect("table");
        assert!(table.contains(&blake3::item_id("Dirt")));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let item = ItemId([0x01; 32]);
        let result = RateTable::new([(item, 1), (item, 2)]);
        assert!(matches!(result, Err(FarmError::UnknownConfiguration(_))));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = RateTable::from_named([("Grin", 1), ("Grin", 1)]);
        assert!(matches!(result, Err(FarmError::UnknownConfiguration(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = RateTable::from_named([("  ", 1)]);
        assert!(matches!(result, Err(FarmError::UnknownConfiguration(_))));
    }

    #[test]
    fn test_empty_table() {
        let table = RateTable::new(Vec::<(ItemId, Amount)>::new()).expect("table");
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }
}
