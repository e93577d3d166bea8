//! # harvest-crypto
//!
//! Identifier derivation for the Harvest ledger.
//!
//! ## Modules
//!
//! - [`blake3`]: Domain-separated BLAKE3 hashing and identifier derivation

pub mod blake3;
