//! Serialized farm handle for multi-threaded hosts.
//!
//! All operations on one farm run one at a time in a single global order.
//! [`SharedFarm`] takes the farm lock for the whole of each operation, so no
//! thread observes a half-applied deposit, withdrawal or claim.

use std::sync::Arc;

use parking_lot::Mutex;

use harvest_types::{AccountId, Amount, BlockNumber, ItemId, Position};

use crate::custody::ItemCustody;
use crate::farm::Farm;
use crate::reward::RewardToken;
use crate::store::PositionStore;
use crate::Result;

/// Cloneable, thread-safe handle to a [`Farm`].
pub struct SharedFarm<S, C, R> {
    inner: Arc<Mutex<Farm<S, C, R>>>,
}

impl<S, C, R> Clone for SharedFarm<S, C, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C, R> SharedFarm<S, C, R>
where
    S: PositionStore,
    C: ItemCustody,
    R: RewardToken,
{
    pub fn new(farm: Farm<S, C, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(farm)),
        }
    }

    /// See [`Farm::deposit`].
    pub fn deposit(&self, account: &AccountId, item: &ItemId, amount: Amount, block: BlockNumber) -> Result<Amount> {
        self.inner.lock().deposit(account, item, amount, block)
    }

    /// See [`Farm::deposit_batch`].
    pub fn deposit_batch(
        &self,
        account: &AccountId,
        items: &[ItemId],
        amounts: &[Amount],
        block: BlockNumber,
    ) -> Result<Amount> {
        self.inner.lock().deposit_batch(account, items, amounts, block)
    }

    /// See [`Farm::withdraw`].
    pub fn withdraw(&self, account: &AccountId, item: &ItemId, amount: Amount, block: BlockNumber) -> Result<Amount> {
        self.inner.lock().withdraw(account, item, amount, block)
    }

    /// See [`Farm::withdraw_batch`].
    pub fn withdraw_batch(
        &self,
        account: &AccountId,
        items: &[ItemId],
        amounts: &[Amount],
        block: BlockNumber,
    ) -> Result<Amount> {
        self.inner.lock().withdraw_batch(account, items, amounts, block)
    }

    /// See [`Farm::claim_reward`].
    pub fn claim_reward(&self, account: &AccountId, item: &ItemId, block: BlockNumber) -> Result<Amount> {
        self.inner.lock().claim_reward(account, item, block)
    }

    /// See [`Farm::calculate_reward`].
    pub fn calculate_reward(&self, account: &AccountId, item: &ItemId, block: BlockNumber) -> Result<Amount> {
        self.inner.lock().calculate_reward(account, item, block)
    }

    /// See [`Farm::deposits`].
    pub fn deposits(&self, account: &AccountId) -> Result<Vec<ItemId>> {
        self.inner.lock().deposits(account)
    }

    /// See [`Farm::position`].
    pub fn position(&self, account: &AccountId, item: &ItemId) -> Result<Position> {
        self.inner.lock().position(account, item)
    }

    /// Run `f` with exclusive access to the farm.
    pub fn with<T>(&self, f: impl FnOnce(&mut Farm<S, C, R>) -> T) -> T {
        f(&mut self.inner.lock())
    }
}
