//! Query functions, one module per table.

pub mod positions;
