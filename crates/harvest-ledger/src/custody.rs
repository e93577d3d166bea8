//! Item custody ledger.
//!
//! The farm never holds item balances itself; it moves units between the
//! depositor and its pool account through an [`ItemCustody`] ledger and
//! surfaces that ledger's errors unchanged.

use std::collections::{BTreeMap, HashMap, HashSet};

use harvest_types::{AccountId, Amount, ItemId};

/// Errors raised by an item custody ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    /// The sender holds fewer units than requested.
    #[error("insufficient balance for transfer: account {account} holds {available} of item {item}, requested {requested}")]
    InsufficientBalance {
        /// Sending account.
        account: AccountId,
        /// Item being moved.
        item: ItemId,
        /// Units requested.
        requested: Amount,
        /// Units held.
        available: Amount,
    },

    /// The operator may not move the owner's items.
    #[error("caller is not owner nor approved: operator {operator}, owner {owner}")]
    NotApproved {
        /// Account whose items would move.
        owner: AccountId,
        /// Account attempting the move.
        operator: AccountId,
    },

    /// Batch item and amount lists differ in length.
    #[error("items and amounts length mismatch: {items} items, {amounts} amounts")]
    LengthMismatch {
        /// Number of items.
        items: usize,
        /// Number of amounts.
        amounts: usize,
    },

    /// The recipient balance would exceed `u128`.
    #[error("balance overflow: account {account}, item {item}")]
    BalanceOverflow {
        /// Receiving account.
        account: AccountId,
        /// Item being credited.
        item: ItemId,
    },
}

/// Multi-item custody ledger contract.
///
/// Transfers are all-or-nothing: an `Err` leaves every balance untouched.
pub trait ItemCustody {
    /// Move `amount` of `item` from `from` to `to` on behalf of `operator`.
    fn transfer_from(
        &mut self,
        operator: &AccountId,
        from: &AccountId,
        to: &AccountId,
        item: &ItemId,
        amount: Amount,
    ) -> Result<(), CustodyError>;

    /// Move several items at once on behalf of `operator`.
    fn batch_transfer_from(
        &mut self,
        operator: &AccountId,
        from: &AccountId,
        to: &AccountId,
        items: &[ItemId],
        amounts: &[Amount],
    ) -> Result<(), CustodyError>;

    /// Units of `item` held by `account`.
    fn balance_of(&self, account: &AccountId, item: &ItemId) -> Amount;
}

/// In-memory custody ledger with operator approvals.
#[derive(Clone, Debug, Default)]
pub struct ItemVault {
    balances: HashMap<(AccountId, ItemId), Amount>,
    approvals: HashSet<(AccountId, AccountId)>,
}

impl ItemVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new units of `item` held by `to`.
    ///
    /// # Errors
    ///
    /// - [`CustodyError::BalanceOverflow`] if the balance would exceed `u128`
    pub fn mint(&mut self, to: &AccountId, item: &ItemId, amount: Amount) -> Result<(), CustodyError> {
        let balance = self.balance_of(to, item);
        let credited = balance
            .checked_add(amount)
            .ok_or(CustodyError::BalanceOverflow { account: *to, item: *item })?;
        self.balances.insert((*to, *item), credited);
        Ok(())
    }

    /// Grant or revoke `operator`'s right to move all of `owner`'s items.
    pub fn set_approval_for_all(&mut self, owner: &AccountId, operator: &AccountId, approved: bool) {
        if approved {
            self.approvals.insert((*owner, *operator));
        } else {
            self.approvals.remove(&(*owner, *operator));
        }
    }

    /// Whether `operator` may move all of `owner`'s items.
    pub fn is_approved_for_all(&self, owner: &AccountId, operator: &AccountId) -> bool {
        self.approvals.contains(&(*owner, *operator))
    }

    fn authorize(&self, operator: &AccountId, owner: &AccountId) -> Result<(), CustodyError> {
        if operator == owner || self.is_approved_for_all(owner, operator) {
            Ok(())
        } else {
            Err(CustodyError::NotApproved {
                owner: *owner,
                operator: *operator,
            })
        }
    }

    /// Compute post-transfer balances for every touched key without writing.
    fn stage(
        &self,
        from: &AccountId,
        to: &AccountId,
        moves: &BTreeMap<ItemId, Amount>,
    ) -> Result<Vec<((AccountId, ItemId), Amount)>, CustodyError> {
        let mut staged = Vec::with_capacity(moves.len() * 2);
        for (item, &amount) in moves {
            let available = self.balance_of(from, item);
            if available < amount {
                return Err(CustodyError::InsufficientBalance {
                    account: *from,
                    item: *item,
                    requested: amount,
                    available,
                });
            }
            if from == to {
                continue;
            }
            let credited = self
                .balance_of(to, item)
                .checked_add(amount)
                .ok_or(CustodyError::BalanceOverflow { account: *to, item: *item })?;
            staged.push(((*from, *item), available - amount));
            staged.push(((*to, *item), credited));
        }
        Ok(staged)
    }
}

impl ItemCustody for ItemVault {
    fn transfer_from(
        &mut self,
        operator: &AccountId,
        from: &AccountId,
        to: &AccountId,
        item: &ItemId,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        self.batch_transfer_from(operator, from, to, &[*item], &[amount])
    }

    fn batch_transfer_from(
        &mut self,
        operator: &AccountId,
        from: &AccountId,
        to: &AccountId,
        items: &[ItemId],
        amounts: &[Amount],
    ) -> Result<(), CustodyError> {
        if items.len() != amounts.len() {
            return Err(CustodyError::LengthMismatch {
                items: items.len(),
                amounts: amounts.len(),
            });
        }
        self.authorize(operator, from)?;

        // Repeated items are checked against their combined amount.
        let mut moves: BTreeMap<ItemId, Amount> = BTreeMap::new();
        for (item, &amount) in items.iter().zip(amounts) {
            let total = moves.entry(*item).or_insert(0);
            *total = total
                .checked_add(amount)
                .ok_or(CustodyError::BalanceOverflow { account: *to, item: *item })?;
        }

        for (key, balance) in self.stage(from, to, &moves)? {
            self.balances.insert(key, balance);
        }
        Ok(())
    }

    fn balance_of(&self, account: &AccountId, item: &ItemId) -> Amount {
        self.balances.get(&(*account, *item)).copied().unwrap_or(0)
    }
}
