//! Integration test harness for the Harvest workspace.
//!
//! Provides the shared fixture the end-to-end tests start from: a farm built
//! from a TOML catalogue, with one signer holding one unit of every item and
//! the pool approved to move them.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p harvest-integration-tests
//! ```

use harvest_config::FarmConfig;
use harvest_crypto::blake3;
use harvest_ledger::{Farm, ItemCustody, ItemVault, PositionStore, RewardBank};
use harvest_types::{AccountId, Amount, ItemId, RATE_MULTIPLIER};

/// Item catalogue: name and daily value in whole reward tokens.
pub const ITEMS: &[(&str, u64)] = &[
    ("Honeycomb", 300),
    ("Grin", 40),
    ("Bottomless Elixir", 250),
    ("Cap of Invisibility", 250),
    ("Ancient Relic", 30),
    ("Castle", 50),
    ("Red Feather", 20),
    ("Diamond", 50),
];

/// Farm type used by the end-to-end tests.
pub type TestFarm<S> = Farm<S, ItemVault, RewardBank>;

/// Catalogue rendered as TOML, the way a host would ship it.
pub fn catalogue_toml() -> String {
    let mut toml = String::from("[farm]\npool_label = \"integration\"\n");
    for (name, value) in ITEMS {
        toml.push_str(&format!("\n[[items]]\nname = \"{name}\"\nvalue = {value}\n"));
    }
    toml
}

/// Parsed catalogue configuration.
pub fn config() -> FarmConfig {
    FarmConfig::from_toml_str(&catalogue_toml()).expect("catalogue should parse")
}

/// The account every scenario acts as.
pub fn signer() -> AccountId {
    blake3::account_id(b"integration-signer")
}

/// Identifiers of the catalogue items, in catalogue order.
pub fn item_ids() -> Vec<ItemId> {
    ITEMS.iter().map(|(name, _)| blake3::item_id(name)).collect()
}

/// Per-block reward rates of the catalogue items, in catalogue order.
pub fn item_rates() -> Vec<Amount> {
    ITEMS
        .iter()
        .map(|(_, value)| Amount::from(*value) * RATE_MULTIPLIER)
        .collect()
}

/// Build a farm over `store` with the signer funded and approved.
pub fn setup<S: PositionStore>(store: S) -> TestFarm<S> {
    let mut farm = config()
        .build_farm(store, ItemVault::new(), RewardBank::new())
        .expect("farm should build from catalogue");
    let pool = *farm.pool();
    let signer = signer();
    for item in item_ids() {
        farm.custody_mut()
            .mint(&signer, &item, 1)
            .expect("minting fixture items should succeed");
    }
    farm.custody_mut().set_approval_for_all(&signer, &pool, true);
    farm
}

/// Custody balances of (pool, signer) for `item`.
pub fn balances<S: PositionStore>(farm: &TestFarm<S>, item: &ItemId) -> (Amount, Amount) {
    (
        farm.custody().balance_of(farm.pool(), item),
        farm.custody().balance_of(&signer(), item),
    )
}
