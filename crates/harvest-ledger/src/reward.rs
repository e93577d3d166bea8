//! Reward token ledger.

use std::collections::HashMap;

use harvest_types::{AccountId, Amount};

/// Reward token ledger contract.
///
/// The farm is the authorised minter, so a payment cannot be refused. The
/// farm checks `total_supply() + amount` for overflow before it pays, which
/// bounds every individual balance as well.
pub trait RewardToken {
    /// Credit `amount` reward units to `to`.
    fn pay(&mut self, to: &AccountId, amount: Amount);

    /// Reward units held by `account`.
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// Reward units issued so far.
    fn total_supply(&self) -> Amount;
}

/// In-memory reward token that mints on every payment.
#[derive(Clone, Debug, Default)]
pub struct RewardBank {
    balances: HashMap<AccountId, Amount>,
    total_supply: Amount,
}

impl RewardBank {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RewardToken for RewardBank {
    fn pay(&mut self, to: &AccountId, amount: Amount) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(*to).or_insert(0) += amount;
        self.total_supply += amount;
        tracing::debug!(to = %to, amount, supply = self.total_supply, "reward minted");
    }

    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }
}
