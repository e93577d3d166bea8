//! Per-account, per-item deposit records.

use serde::{Deserialize, Serialize};

use crate::{Amount, BlockNumber};

/// Units of one item deposited by one account.
///
/// Reward is never stored here. It is realized at settlement time from
/// `amount`, the item rate and the blocks elapsed since
/// `last_settlement_block`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Units currently deposited.
    pub amount: Amount,
    /// Block as of which `amount` has been fully rewarded.
    /// Meaningless while `amount` is zero.
    pub last_settlement_block: BlockNumber,
}

impl Position {
    /// Whether this position holds no units.
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}
