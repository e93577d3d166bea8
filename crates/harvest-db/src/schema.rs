//! SQL schema definitions, one constant per schema version.

/// v1: the positions table.
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS positions (
    account BLOB NOT NULL,
    item BLOB NOT NULL,
    amount BLOB NOT NULL,
    last_settlement_block INTEGER NOT NULL,
    PRIMARY KEY (account, item)
) WITHOUT ROWID;
"#;

/// v2: per-item lookups for pool totals.
pub const SCHEMA_V2: &str = r#"
CREATE INDEX IF NOT EXISTS idx_positions_item ON positions (item);
"#;
