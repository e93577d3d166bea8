//! # harvest-config
//!
//! Configuration file management for farm hosts.
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration and farm construction
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod logging;

pub use config::{FarmConfig, FarmSection, ItemEntry, LoggingConfig};
