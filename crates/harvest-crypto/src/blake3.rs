//! Domain-separated BLAKE3 hashing.
//!
//! Item identifiers are derived from item names and account identifiers from
//! public key bytes. Each purpose has its own registered context string so the
//! two identifier spaces can never collide.

use harvest_types::{AccountId, ItemId};

/// Registered BLAKE3 context strings.
pub mod contexts {
    pub const ITEM_ID: &str = "Harvest v1 item-id";
    pub const ACCOUNT_ID: &str = "Harvest v1 account-id";
    pub const POOL_ACCOUNT: &str = "Harvest v1 pool-account";

    /// All registered context strings.
    pub const ALL_CONTEXTS: &[&str] = &[ITEM_ID, ACCOUNT_ID, POOL_ACCOUNT];
}

/// Compute the BLAKE3 hash of the input data.
pub fn hash(data: &[u8]) -> [u8; 32] {
    *::blake3::hash(data).as_bytes()
}

/// Derive 32 bytes using BLAKE3's key derivation mode.
///
/// `context` must be one of [`contexts::ALL_CONTEXTS`].
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    let mut hasher = ::blake3::Hasher::new_derive_key(context);
    hasher.update(key_material);
    *hasher.finalize().as_bytes()
}

/// Identifier of the item with the given name.
pub fn item_id(name: &str) -> ItemId {
    ItemId(derive_key(contexts::ITEM_ID, name.as_bytes()))
}

/// Identifier of the account owning the given public key bytes.
pub fn account_id(public_key: &[u8]) -> AccountId {
    AccountId(derive_key(contexts::ACCOUNT_ID, public_key))
}

/// Custody account of a farm instance, derived from a free-form label.
pub fn pool_account(label: &str) -> AccountId {
    AccountId(derive_key(contexts::POOL_ACCOUNT, label.as_bytes()))
}
