//! TOML configuration.
//!
//! ```toml
//! [farm]
//! pool_label = "main"
//! unknown_items = "reject"
//!
//! [[items]]
//! name = "Honeycomb"
//! value = 300
//!
//! [[items]]
//! name = "Grin"
//! rate_per_block = "50000000000000"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::PathBuf;

use harvest_crypto::blake3;
use harvest_ledger::{
    Farm, FarmError, ItemCustody, PositionStore, RateTable, RewardToken, UnknownItemPolicy,
};
use harvest_types::{AccountId, Amount, RATE_MULTIPLIER};
use serde::{Deserialize, Serialize};

/// Complete farm configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Farm instance settings.
    #[serde(default)]
    pub farm: FarmSection,
    /// Item catalogue with reward rates.
    #[serde(default)]
    pub items: Vec<ItemEntry>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Farm instance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmSection {
    /// Pool account as 64 hex characters. Empty = derived from `pool_label`.
    #[serde(default)]
    pub pool: String,
    /// Label the pool account is derived from when `pool` is empty.
    #[serde(default = "default_pool_label")]
    pub pool_label: String,
    /// Treatment of items missing from the catalogue.
    #[serde(default)]
    pub unknown_items: UnknownItemPolicy,
}

/// One item of the catalogue.
///
/// Exactly one of `value` and `rate_per_block` must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemEntry {
    /// Item name; the item id is derived from it.
    pub name: String,
    /// Daily value in whole reward tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    /// Reward units per block per deposited unit, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_per_block: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_pool_label() -> String {
    "default".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FarmSection {
    fn default() -> Self {
        Self {
            pool: String::new(),
            pool_label: default_pool_label(),
            unknown_items: UnknownItemPolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ItemEntry {
    /// Per-block reward rate of this item.
    ///
    /// # Errors
    ///
    /// - [`FarmError::UnknownConfiguration`] if neither or both of `value`
    ///   and `rate_per_block` are set, or the rate is not a decimal `u128`
    /// - [`FarmError::ArithmeticOverflow`] if `value * RATE_MULTIPLIER`
    ///   overflows
    pub fn rate(&self) -> harvest_ledger::Result<Amount> {
        match (self.value, &self.rate_per_block) {
            (Some(value), None) => Amount::from(value)
                .checked_mul(RATE_MULTIPLIER)
                .ok_or(FarmError::ArithmeticOverflow { context: "item rate" }),
            (None, Some(rate)) => rate.trim().parse::<Amount>().map_err(|e| {
                FarmError::UnknownConfiguration(format!(
                    "item '{}': invalid rate_per_block '{rate}': {e}",
                    self.name
                ))
            }),
            (Some(_), Some(_)) => Err(FarmError::UnknownConfiguration(format!(
                "item '{}': set either value or rate_per_block, not both",
                self.name
            ))),
            (None, None) => Err(FarmError::UnknownConfiguration(format!(
                "item '{}': missing value or rate_per_block",
                self.name
            ))),
        }
    }
}

impl FarmConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build the rate table from the item catalogue.
    ///
    /// # Errors
    ///
    /// - [`FarmError::UnknownConfiguration`] on a malformed entry, an empty
    ///   name or a repeated name
    pub fn rate_table(&self) -> harvest_ledger::Result<RateTable> {
        let mut rates = Vec::with_capacity(self.items.len());
        for entry in &self.items {
            rates.push((entry.name.as_str(), entry.rate()?));
        }
        RateTable::from_named(rates)
    }

    /// Custody account of the farm pool.
    ///
    /// # Errors
    ///
    /// - [`FarmError::UnknownConfiguration`] if `pool` is not 64 hex characters
    pub fn pool_account(&self) -> harvest_ledger::Result<AccountId> {
        if self.farm.pool.is_empty() {
            return Ok(blake3::pool_account(&self.farm.pool_label));
        }
        self.farm.pool.parse().map_err(|e| {
            FarmError::UnknownConfiguration(format!("invalid pool account: {e}"))
        })
    }

    /// Construct a farm from this configuration and the given backends.
    pub fn build_farm<S, C, R>(
        &self,
        store: S,
        custody: C,
        rewards: R,
    ) -> harvest_ledger::Result<Farm<S, C, R>>
    where
        S: PositionStore,
        C: ItemCustody,
        R: RewardToken,
    {
        let farm = Farm::new(self.pool_account()?, self.rate_table()?, store, custody, rewards)
            .with_unknown_item_policy(self.farm.unknown_items);
        Ok(farm)
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("HARVEST_CONFIG_DIR") {
            return PathBuf::from(dir).join("harvest.toml");
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".harvest"))
            .unwrap_or_else(|_| PathBuf::from("/tmp/harvest"))
            .join("harvest.toml")
    }
}
