//! # harvest-ledger
//!
//! Continuous per-unit reward accrual over deposited items.
//!
//! Accounts deposit item units into the farm's pool. Every unit earns the
//! item's fixed rate in reward tokens for each block it stays deposited.
//! Every deposit, withdrawal or claim first settles the reward accrued since
//! the account last touched that item, so reward is never lost or paid twice.
//!
//! ## Modules
//!
//! - [`rates`]: Immutable per-item reward rates
//! - [`store`]: Position storage contract and in-memory store
//! - [`accrual`]: Pure settlement arithmetic
//! - [`custody`]: Item custody ledger contract and in-memory vault
//! - [`reward`]: Reward token ledger contract and in-memory bank
//! - [`farm`]: Deposit, withdraw and claim operations
//! - [`shared`]: Serialized handle for multi-threaded hosts

pub mod accrual;
pub mod custody;
pub mod farm;
pub mod rates;
pub mod reward;
pub mod shared;
pub mod store;

pub use custody::{CustodyError, ItemCustody, ItemVault};
pub use farm::{Farm, UnknownItemPolicy};
pub use rates::RateTable;
pub use reward::{RewardBank, RewardToken};
pub use shared::SharedFarm;
pub use store::{MemoryPositionStore, PositionStore};

use harvest_types::{AccountId, Amount, BlockNumber, ItemId};

/// Failure reported by a [`PositionStore`] backend.
#[derive(Debug, thiserror::Error)]
#[error("position store: {0}")]
pub struct StoreError(pub String);

/// Error types for farm operations.
#[derive(Debug, thiserror::Error)]
pub enum FarmError {
    /// The item custody ledger refused the transfer.
    #[error(transparent)]
    Custody(#[from] CustodyError),

    /// Withdrawal exceeds the units the account has deposited.
    #[error("insufficient balance: account {account} deposited {deposited} of item {item}, requested {requested}")]
    InsufficientPoolBalance {
        /// Acting account.
        account: AccountId,
        /// Item being withdrawn.
        item: ItemId,
        /// Units requested.
        requested: Amount,
        /// Units currently deposited.
        deposited: Amount,
    },

    /// Reward or balance arithmetic left the representable range.
    #[error("arithmetic overflow in {context}")]
    ArithmeticOverflow {
        /// The quantity being computed.
        context: &'static str,
    },

    /// The rate table or its source is malformed.
    #[error("invalid configuration: {0}")]
    UnknownConfiguration(String),

    /// The item is not registered in the rate table.
    #[error("unknown item {item}")]
    UnknownItem {
        /// The unregistered item.
        item: ItemId,
    },

    /// Batch item and amount lists differ in length.
    #[error("items and amounts length mismatch: {items} items, {amounts} amounts")]
    LengthMismatch {
        /// Number of items.
        items: usize,
        /// Number of amounts.
        amounts: usize,
    },

    /// The supplied block is older than state already processed.
    #[error("block {current} precedes last processed block {last}")]
    ClockRegression {
        /// Latest block already processed.
        last: BlockNumber,
        /// Block supplied by the caller.
        current: BlockNumber,
    },

    /// The farm's own pool account tried to deposit, withdraw or claim.
    #[error("pool account {account} cannot hold positions")]
    PoolAccount {
        /// The pool account.
        account: AccountId,
    },

    /// The position store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience result type for farm operations.
pub type Result<T> = std::result::Result<T, FarmError>;
