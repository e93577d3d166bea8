//! Position query functions.

use harvest_types::{AccountId, Amount, BlockNumber, ItemId, Position};
use rusqlite::{Connection, OptionalExtension};

use crate::{DbError, Result};

fn decode_amount(bytes: &[u8]) -> Result<Amount> {
    let raw: [u8; 16] = bytes
        .try_into()
        .map_err(|_| DbError::Corrupt {
            column: "amount",
            detail: format!("{} bytes, expected 16", bytes.len()),
        })?;
    Ok(Amount::from_be_bytes(raw))
}

fn decode_id(bytes: &[u8]) -> Result<[u8; 32]> {
    bytes
        .try_into()
        .map_err(|_| DbError::Corrupt {
            column: "identifier",
            detail: format!("{} bytes, expected 32", bytes.len()),
        })
}

fn decode_block(raw: i64) -> Result<BlockNumber> {
    BlockNumber::try_from(raw).map_err(|_| DbError::Corrupt {
        column: "last_settlement_block",
        detail: format!("negative block {raw}"),
    })
}

fn encode_block(block: BlockNumber) -> Result<i64> {
    i64::try_from(block).map_err(|_| DbError::Corrupt {
        column: "last_settlement_block",
        detail: format!("block {block} exceeds the SQLite integer range"),
    })
}

/// Get the position of `account` in `item`, if one was ever stored.
pub fn get(conn: &Connection, account: &AccountId, item: &ItemId) -> Result<Option<Position>> {
    let row = conn
        .query_row(
            "SELECT amount, last_settlement_block FROM positions
             WHERE account = ?1 AND item = ?2",
            rusqlite::params![account.as_bytes().as_slice(), item.as_bytes().as_slice()],
            |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;

    match row {
        Some((amount, block)) => Ok(Some(Position {
            amount: decode_amount(&amount)?,
            last_settlement_block: decode_block(block)?,
        })),
        None => Ok(None),
    }
}

/// Insert or replace the position of `account` in `item`.
pub fn upsert(conn: &Connection, account: &AccountId, item: &ItemId, position: &Position) -> Result<()> {
    let block = encode_block(position.last_settlement_block)?;
    conn.execute(
        "INSERT OR REPLACE INTO positions (account, item, amount, last_settlement_block)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            account.as_bytes().as_slice(),
            item.as_bytes().as_slice(),
            position.amount.to_be_bytes().as_slice(),
            block,
        ],
    )?;
    Ok(())
}

/// Insert or replace several positions of `account` in one transaction.
pub fn upsert_many(
    conn: &mut Connection,
    account: &AccountId,
    positions: &[(ItemId, Position)],
) -> Result<()> {
    let tx = conn.transaction()?;
    for (item, position) in positions {
        upsert(&tx, account, item, position)?;
    }
    tx.commit()?;
    Ok(())
}

/// Items in which `account` holds a non-zero amount, ordered by item id.
pub fn held_items(conn: &Connection, account: &AccountId) -> Result<Vec<ItemId>> {
    let mut stmt = conn.prepare(
        "SELECT item FROM positions
         WHERE account = ?1 AND amount != ?2
         ORDER BY item",
    )?;
    let zero = 0u128.to_be_bytes();

    let rows = stmt
        .query_map(
            rusqlite::params![account.as_bytes().as_slice(), zero.as_slice()],
            |row| row.get::<_, Vec<u8>>(0),
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.iter()
        .map(|bytes| decode_id(bytes).map(ItemId))
        .collect()
}

/// Sum of all deposited units of `item` across accounts.
pub fn pooled_amount(conn: &Connection, item: &ItemId) -> Result<Amount> {
    let mut stmt = conn.prepare("SELECT amount FROM positions WHERE item = ?1")?;
    let rows = stmt
        .query_map([item.as_bytes().as_slice()], |row| row.get::<_, Vec<u8>>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut total: Amount = 0;
    for bytes in &rows {
        total = total
            .checked_add(decode_amount(bytes)?)
            .ok_or_else(|| DbError::Corrupt {
                column: "amount",
                detail: "pooled total overflows u128".into(),
            })?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: AccountId = AccountId([0x0A; 32]);
    const BOB: AccountId = AccountId([0x0B; 32]);
    const GRIN: ItemId = ItemId([0x01; 32]);
    const ELIXIR: ItemId = ItemId([0x02; 32]);

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_get_missing() {
        let conn = test_db();
        assert_eq!(get(&conn, &ALICE, &GRIN).expect("get"), None);
    }

    #[test]
    fn test_upsert_and_get() {
        let conn = test_db();
        let position = Position {
            amount: u128::MAX - 1,
            last_settlement_block: 42,
        };
        upsert(&conn, &ALICE, &GRIN, &position).expect("upsert");
        assert_eq!(get(&conn, &ALICE, &GRIN).expect("get"), Some(position));

        let emptied = Position { amount: 0, last_settlement_block: 50 };
        upsert(&conn, &ALICE, &GRIN, &emptied).expect("replace");
        assert_eq!(get(&conn, &ALICE, &GRIN).expect("get"), Some(emptied));
    }

    #[test]
    fn test_held_items_skips_empty() {
        let conn = test_db();
        upsert(&conn, &ALICE, &GRIN, &Position { amount: 1, last_settlement_block: 1 }).expect("upsert");
        upsert(&conn, &ALICE, &ELIXIR, &Position { amount: 0, last_settlement_block: 1 }).expect("upsert");
        upsert(&conn, &BOB, &ELIXIR, &Position { amount: 3, last_settlement_block: 1 }).expect("upsert");

        assert_eq!(held_items(&conn, &ALICE).expect("held"), vec![GRIN]);
        assert_eq!(held_items(&conn, &BOB).expect("held"), vec![ELIXIR]);
    }

    #[test]
    fn test_pooled_amount() {
        let conn = test_db();
        upsert(&conn, &ALICE, &GRIN, &Position { amount: 2, last_settlement_block: 1 }).expect("upsert");
        upsert(&conn, &BOB, &GRIN, &Position { amount: 5, last_settlement_block: 3 }).expect("upsert");
        assert_eq!(pooled_amount(&conn, &GRIN).expect("pooled"), 7);
        assert_eq!(pooled_amount(&conn, &ELIXIR).expect("pooled"), 0);
    }

    #[test]
    fn test_corrupt_amount_rejected() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO positions (account, item, amount, last_settlement_block)
             VALUES (?1, ?2, ?3, 0)",
            rusqlite::params![ALICE.as_bytes().as_slice(), GRIN.as_bytes().as_slice(), vec![1u8; 3]],
        )
        .expect("insert");
        assert!(matches!(get(&conn, &ALICE, &GRIN), Err(DbError::Corrupt { column: "amount", .. })));
    }

    #[test]
    fn test_block_beyond_sqlite_range_rejected() {
        let conn = test_db();
        let far = Position {
            amount: 1,
            last_settlement_block: u64::MAX,
        };
        let result = upsert(&conn, &ALICE, &GRIN, &far);
        assert!(matches!(
            result,
            Err(DbError::Corrupt { column: "last_settlement_block", .. })
        ));
        assert_eq!(get(&conn, &ALICE, &GRIN).expect("get"), None);
    }

    #[test]
    fn test_negative_block_rejected() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO positions (account, item, amount, last_settlement_block)
             VALUES (?1, ?2, ?3, -1)",
            rusqlite::params![
                ALICE.as_bytes().as_slice(),
                GRIN.as_bytes().as_slice(),
                1u128.to_be_bytes().as_slice()
            ],
        )
        .expect("insert");
        assert!(matches!(
            get(&conn, &ALICE, &GRIN),
            Err(DbError::Corrupt { column: "last_settlement_block", .. })
        ));
    }

    #[test]
    fn test_upsert_many_is_all_or_nothing() {
        let mut conn = test_db();
        let held = Position { amount: 3, last_settlement_block: 5 };
        upsert(&conn, &ALICE, &GRIN, &held).expect("upsert");

        let moved = Position { amount: 4, last_settlement_block: 9 };
        let unencodable = Position {
            amount: 1,
            last_settlement_block: u64::MAX,
        };
        let result = upsert_many(&mut conn, &ALICE, &[(GRIN, moved), (ELIXIR, unencodable)]);
        assert!(matches!(result, Err(DbError::Corrupt { .. })));
        assert_eq!(get(&conn, &ALICE, &GRIN).expect("get"), Some(held));
        assert_eq!(get(&conn, &ALICE, &ELIXIR).expect("get"), None);

        upsert_many(&mut conn, &ALICE, &[(GRIN, moved), (ELIXIR, moved)]).expect("upsert_many");
        assert_eq!(get(&conn, &ALICE, &GRIN).expect("get"), Some(moved));
        assert_eq!(pooled_amount(&conn, &ELIXIR).expect("pooled"), 4);
    }
}
