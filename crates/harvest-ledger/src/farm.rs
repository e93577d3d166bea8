//! Deposit, withdraw and claim operations.
//!
//! Every mutating operation runs as one atomic step:
//!
//! 1. **Plan**: read each touched position, settle it at the supplied block,
//!    apply the requested change and validate bounds, all in memory.
//! 2. **Commit**: write the staged positions to the store in one
//!    all-or-nothing [`PositionStore::put_many`].
//! 3. **Move**: perform the single custody transfer (batched for batch
//!    calls). If the custody ledger refuses, every staged position is
//!    restored and the custody error is returned unchanged.
//! 4. **Pay**: credit the aggregate settled reward in one payment.
//!
//! The pool account itself cannot act. The farm owns its ledgers and every operation takes `&mut self`, so a
//! ledger cannot re-enter the farm while an operation is in flight.

use serde::{Deserialize, Serialize};

use harvest_types::{AccountId, Amount, BlockNumber, ItemId, Position};

use crate::accrual;
use crate::custody::{CustodyError, ItemCustody};
use crate::rates::RateTable;
use crate::reward::RewardToken;
use crate::store::PositionStore;
use crate::{FarmError, Result};

/// How operations treat items missing from the rate table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownItemPolicy {
    /// Mutating operations on unregistered items fail with
    /// [`FarmError::UnknownItem`].
    #[default]
    Reject,
    /// Unregistered items are accepted and earn nothing.
    ZeroRate,
}

#[derive(Clone, Copy, Debug)]
enum Change {
    Credit(Amount),
    Debit(Amount),
    Touch,
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    IntoPool,
    OutOfPool,
}

enum Movement<'a> {
    Nothing,
    Single(Direction, ItemId, Amount),
    Batch(Direction, &'a [ItemId], &'a [Amount]),
}

struct Staged {
    item: ItemId,
    before: Position,
    after: Position,
}

struct Plan {
    staged: Vec<Staged>,
    reward: Amount,
}

/// Reward farm over a rate table, a position store and two external ledgers.
pub struct Farm<S, C, R> {
    pool: AccountId,
    rates: RateTable,
    store: S,
    custody: C,
    rewards: R,
    unknown_items: UnknownItemPolicy,
    last_block: BlockNumber,
}

impl<S, C, R> Farm<S, C, R>
where
    S: PositionStore,
    C: ItemCustody,
    R: RewardToken,
{
    /// Create a farm whose deposited items are held by `pool`.
    pub fn new(pool: AccountId, rates: RateTable, store: S, custody: C, rewards: R) -> Self {
        tracing::info!(pool = %pool, items = rates.len(), "farm created");
        Self {
            pool,
            rates,
            store,
            custody,
            rewards,
            unknown_items: UnknownItemPolicy::default(),
            last_block: 0,
        }
    }

    /// Replace the unknown-item policy.
    pub fn with_unknown_item_policy(mut self, policy: UnknownItemPolicy) -> Self {
        self.unknown_items = policy;
        self
    }

    /// Custody account holding deposited items.
    pub fn pool(&self) -> &AccountId {
        &self.pool
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn unknown_item_policy(&self) -> UnknownItemPolicy {
        self.unknown_items
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Mutable access to the custody ledger, for host-side setup such as
    /// minting and approvals.
    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    pub fn rewards(&self) -> &R {
        &self.rewards
    }

    /// Release the store and both ledgers, e.g. to reopen them after a restart.
    pub fn into_parts(self) -> (S, C, R) {
        (self.store, self.custody, self.rewards)
    }

    /// Latest block at which an operation succeeded.
    pub fn last_block(&self) -> BlockNumber {
        self.last_block
    }

    /// Deposit `amount` units of `item`, paying out reward settled so far.
    ///
    /// A zero amount only settles and pays.
    ///
    /// # Errors
    ///
    /// - [`FarmError::Custody`] if the custody ledger refuses the transfer
    /// - [`FarmError::UnknownItem`] under [`UnknownItemPolicy::Reject`]
    /// - [`FarmError::ArithmeticOverflow`] on overflow
    pub fn deposit(
        &mut self,
        account: &AccountId,
        item: &ItemId,
        amount: Amount,
        block: BlockNumber,
    ) -> Result<Amount> {
        self.execute(
            "deposit",
            account,
            &[(*item, Change::Credit(amount))],
            Movement::Single(Direction::IntoPool, *item, amount),
            block,
        )
    }

    /// Deposit several items with a single custody transfer.
    ///
    /// # Errors
    ///
    /// - [`FarmError::LengthMismatch`] if the lists differ in length
    /// - otherwise as [`Farm::deposit`]; any failure leaves every item untouched
    pub fn deposit_batch(
        &mut self,
        account: &AccountId,
        items: &[ItemId],
        amounts: &[Amount],
        block: BlockNumber,
    ) -> Result<Amount> {
        let changes = pair(items, amounts, Change::Credit)?;
        self.execute(
            "deposit_batch",
            account,
            &changes,
            Movement::Batch(Direction::IntoPool, items, amounts),
            block,
        )
    }

    /// Withdraw `amount` units of `item`, paying out reward settled so far.
    ///
    /// # Errors
    ///
    /// - [`FarmError::InsufficientPoolBalance`] if `amount` exceeds the
    ///   deposited units
    /// - [`FarmError::UnknownItem`] under [`UnknownItemPolicy::Reject`]
    /// - [`FarmError::Custody`] if the custody ledger refuses the transfer
    pub fn withdraw(
        &mut self,
        account: &AccountId,
        item: &ItemId,
        amount: Amount,
        block: BlockNumber,
    ) -> Result<Amount> {
        self.execute(
            "withdraw",
            account,
            &[(*item, Change::Debit(amount))],
            Movement::Single(Direction::OutOfPool, *item, amount),
            block,
        )
    }

    /// Withdraw several items with a single custody transfer.
    ///
    /// # Errors
    ///
    /// - [`FarmError::LengthMismatch`] if the lists differ in length
    /// - otherwise as [`Farm::withdraw`]; any failure leaves every item untouched
    pub fn withdraw_batch(
        &mut self,
        account: &AccountId,
        items: &[ItemId],
        amounts: &[Amount],
        block: BlockNumber,
    ) -> Result<Amount> {
        let changes = pair(items, amounts, Change::Debit)?;
        self.execute(
            "withdraw_batch",
            account,
            &changes,
            Movement::Batch(Direction::OutOfPool, items, amounts),
            block,
        )
    }

    /// Settle `item` and pay the reward due. Custody is not touched.
    ///
    /// # Errors
    ///
    /// - [`FarmError::UnknownItem`] under [`UnknownItemPolicy::Reject`]
    /// - [`FarmError::ArithmeticOverflow`] on overflow
    pub fn claim_reward(
        &mut self,
        account: &AccountId,
        item: &ItemId,
        block: BlockNumber,
    ) -> Result<Amount> {
        self.execute(
            "claim_reward",
            account,
            &[(*item, Change::Touch)],
            Movement::Nothing,
            block,
        )
    }

    /// Reward a settlement of `item` would pay at `block`, without mutating
    /// anything.
    pub fn calculate_reward(
        &self,
        account: &AccountId,
        item: &ItemId,
        block: BlockNumber,
    ) -> Result<Amount> {
        let position = self.store.get(account, item)?;
        accrual::pending(&position, block, self.rates.rate_of(item))
    }

    /// Items in which `account` currently has units deposited.
    pub fn deposits(&self, account: &AccountId) -> Result<Vec<ItemId>> {
        Ok(self.store.items_held(account)?)
    }

    /// Current position of `account` in `item`.
    pub fn position(&self, account: &AccountId, item: &ItemId) -> Result<Position> {
        Ok(self.store.get(account, item)?)
    }

    fn execute(
        &mut self,
        op: &'static str,
        account: &AccountId,
        changes: &[(ItemId, Change)],
        movement: Movement<'_>,
        block: BlockNumber,
    ) -> Result<Amount> {
        let result = self.try_execute(account, changes, movement, block);
        match &result {
            Ok(reward) => tracing::info!(
                op,
                account = %account,
                items = changes.len(),
                reward = *reward,
                block,
                "farm operation applied"
            ),
            Err(err) => tracing::warn!(
                op,
                account = %account,
                block,
                error = %err,
                "farm operation rejected"
            ),
        }
        result
    }

    fn try_execute(
        &mut self,
        account: &AccountId,
        changes: &[(ItemId, Change)],
        movement: Movement<'_>,
        block: BlockNumber,
    ) -> Result<Amount> {
        // Custody would route the pool's items pool -> pool.
        if *account == self.pool {
            return Err(FarmError::PoolAccount { account: *account });
        }
        if block < self.last_block {
            return Err(FarmError::ClockRegression {
                last: self.last_block,
                current: block,
            });
        }

        let plan = self.plan(account, changes, block)?;
        self.rewards
            .total_supply()
            .checked_add(plan.reward)
            .ok_or(FarmError::ArithmeticOverflow { context: "reward supply" })?;

        self.commit(account, &plan.staged)?;
        if let Err(err) = self.move_items(account, movement) {
            self.rollback(account, &plan.staged)?;
            return Err(err.into());
        }

        if plan.reward > 0 {
            self.rewards.pay(account, plan.reward);
        }
        self.last_block = block;
        Ok(plan.reward)
    }

    fn check_known(&self, item: &ItemId) -> Result<()> {
        match self.unknown_items {
            UnknownItemPolicy::Reject if !self.rates.contains(item) => {
                Err(FarmError::UnknownItem { item: *item })
            }
            _ => Ok(()),
        }
    }

    fn plan(
        &self,
        account: &AccountId,
        changes: &[(ItemId, Change)],
        block: BlockNumber,
    ) -> Result<Plan> {
        let mut staged: Vec<Staged> = Vec::with_capacity(changes.len());
        let mut reward: Amount = 0;

        for (item, change) in changes {
            self.check_known(item)?;

            // Repeated items continue from the already staged position.
            let index = match staged.iter().position(|s| s.item == *item) {
                Some(index) => index,
                None => {
                    let before = self.store.get(account, item)?;
                    staged.push(Staged {
                        item: *item,
                        before,
                        after: before,
                    });
                    staged.len() - 1
                }
            };
            let entry = &mut staged[index];

            let (mut position, due) = accrual::settle(entry.after, block, self.rates.rate_of(item))?;
            reward = reward
                .checked_add(due)
                .ok_or(FarmError::ArithmeticOverflow { context: "reward total" })?;

            match *change {
                Change::Credit(amount) => {
                    position.amount = position
                        .amount
                        .checked_add(amount)
                        .ok_or(FarmError::ArithmeticOverflow { context: "deposited amount" })?;
                }
                Change::Debit(amount) => {
                    if amount > position.amount {
                        return Err(FarmError::InsufficientPoolBalance {
                            account: *account,
                            item: *item,
                            requested: amount,
                            deposited: position.amount,
                        });
                    }
                    position.amount -= amount;
                }
                Change::Touch => {}
            }

            tracing::debug!(
                account = %account,
                item = %item,
                due,
                amount = position.amount,
                block,
                "position staged"
            );
            entry.after = position;
        }

        Ok(Plan { staged, reward })
    }

    fn commit(&mut self, account: &AccountId, staged: &[Staged]) -> Result<()> {
        let writes: Vec<(ItemId, Position)> = staged.iter().map(|s| (s.item, s.after)).collect();
        Ok(self.store.put_many(account, &writes)?)
    }

    fn rollback(&mut self, account: &AccountId, staged: &[Staged]) -> Result<()> {
        let writes: Vec<(ItemId, Position)> = staged.iter().map(|s| (s.item, s.before)).collect();
        if let Err(err) = self.store.put_many(account, &writes) {
            tracing::error!(
                account = %account,
                positions = staged.len(),
                error = %err,
                "position rollback failed"
            );
            return Err(err.into());
        }
        tracing::warn!(account = %account, positions = staged.len(), "positions rolled back");
        Ok(())
    }

    fn move_items(
        &mut self,
        account: &AccountId,
        movement: Movement<'_>,
    ) -> std::result::Result<(), CustodyError> {
        let pool = self.pool;
        let route = |direction: Direction| match direction {
            Direction::IntoPool => (*account, pool),
            Direction::OutOfPool => (pool, *account),
        };
        match movement {
            Movement::Nothing => Ok(()),
            Movement::Single(direction, item, amount) => {
                let (from, to) = route(direction);
                self.custody.transfer_from(&pool, &from, &to, &item, amount)
            }
            Movement::Batch(direction, items, amounts) => {
                let (from, to) = route(direction);
                self.custody
                    .batch_transfer_from(&pool, &from, &to, items, amounts)
            }
        }
    }
}

fn pair(
    items: &[ItemId],
    amounts: &[Amount],
    change: fn(Amount) -> Change,
) -> Result<Vec<(ItemId, Change)>> {
    if items.len() != amounts.len() {
        return Err(FarmError::LengthMismatch {
            items: items.len(),
            amounts: amounts.len(),
        });
    }
    Ok(items
        .iter()
        .zip(amounts)
        .map(|(item, &amount)| (*item, change(amount)))
        .collect())
}
