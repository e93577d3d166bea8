//! Settlement arithmetic.
//!
//! ## Formula
//!
//! ```text
//! reward = amount * rate * (current_block - last_settlement_block)
//! ```
//!
//! Pure functions over a [`Position`]: no storage, no ledgers. The rate is
//! passed in at every settlement and never recorded in the position.

use harvest_types::{Amount, BlockNumber, Position};

use crate::{FarmError, Result};

/// Reward `position` has earned since its last settlement.
///
/// Zero when the position is empty or was settled in `current_block`.
///
/// # Errors
///
/// - [`FarmError::ClockRegression`] if `current_block` precedes the last
///   settlement of a non-empty position
/// - [`FarmError::ArithmeticOverflow`] if the reward exceeds `u128`
pub fn pending(position: &Position, current_block: BlockNumber, rate: Amount) -> Result<Amount> {
    if position.is_empty() {
        return Ok(0);
    }

    let elapsed = current_block
        .checked_sub(position.last_settlement_block)
        .ok_or(FarmError::ClockRegression {
            last: position.last_settlement_block,
            current: current_block,
        })?;
    if elapsed == 0 {
        return Ok(0);
    }

    position
        .amount
        .checked_mul(rate)
        .and_then(|per_block| per_block.checked_mul(Amount::from(elapsed)))
        .ok_or(FarmError::ArithmeticOverflow { context: "pending reward" })
}

/// Settle `position` at `current_block`.
///
/// Returns the position with its clock advanced to `current_block` and the
/// reward due. The amount is left unchanged.
///
/// # Errors
///
/// Same as [`pending`].
pub fn settle(
    position: Position,
    current_block: BlockNumber,
    rate: Amount,
) -> Result<(Position, Amount)> {
    let reward = pending(&position, current_block, rate)?;
    let settled = Position {
        last_settlement_block: current_block,
        ..position
    };

    tracing::trace!(
        amount = settled.amount,
        rate,
        reward,
        block = current_block,
        "position settled"
    );

    Ok((settled, reward))
}
