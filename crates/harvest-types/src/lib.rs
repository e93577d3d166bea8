//! # harvest-types
//!
//! Shared domain types used across the Harvest workspace.
//!
//! ## Modules
//!
//! - [`ids`]: Account and item identifiers
//! - [`position`]: Per-account, per-item deposit records

pub mod ids;
pub mod position;

pub use ids::{AccountId, ItemId};
pub use position::Position;

/// Item units and reward-token units (smallest denomination).
pub type Amount = u128;

/// Discrete time step supplied by the host environment.
pub type BlockNumber = u64;

/// Approximate number of blocks produced per day.
pub const BLOCKS_PER_DAY: u64 = 6000;

/// Decimal places of the reward token.
pub const REWARD_DECIMALS: u32 = 18;

/// One whole reward token in smallest units.
pub const REWARD_UNIT: Amount = 10u128.pow(REWARD_DECIMALS);

/// Per-block rate for an item worth one whole reward token per day.
///
/// An item with daily value `v` earns `v * RATE_MULTIPLIER` units per block
/// per deposited unit. Integer division; the remainder is dropped.
pub const RATE_MULTIPLIER: Amount = REWARD_UNIT / BLOCKS_PER_DAY as Amount;

/// Error types for parsing shared types.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// Hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Decoded identifier has the wrong length.
    #[error("invalid identifier length: expected 32, got {0}")]
    InvalidLength(usize),
}
