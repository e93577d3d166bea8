//! Integration test: farm behaviour end to end.
//!
//! Every scenario runs twice, once over the in-memory position store and once
//! over the SQLite store, starting from the catalogue fixture:
//! 1. `deposits` lists held items
//! 2. `calculate_reward` grows linearly with blocks
//! 3. `claim_reward` pays and resets
//! 4. `deposit` / `deposit_batch` move custody and pay out on touch
//! 5. `withdraw` / `withdraw_batch` return custody and pay out
//! 6. Every rejection leaves positions, custody and rewards untouched

use harvest_integration_tests::{balances, item_ids, item_rates, setup, signer};
use harvest_ledger::{CustodyError, FarmError, RewardToken};

macro_rules! farm_suite {
    ($suite:ident, $store:expr) => {
        mod $suite {
            use super::*;

            #[test]
            fn deposits_lists_held_items() {
                let mut farm = setup($store);
                let signer = signer();
                let item = item_ids()[0];

                assert!(farm.deposits(&signer).expect("deposits").is_empty());
                farm.deposit(&signer, &item, 1, 1).expect("deposit");
                assert_eq!(farm.deposits(&signer).expect("deposits"), vec![item]);
                farm.withdraw(&signer, &item, 1, 2).expect("withdraw");
                assert!(farm.deposits(&signer).expect("deposits").is_empty());
            }

            #[test]
            fn calculate_reward_after_seven_blocks() {
                let mut farm = setup($store);
                let signer = signer();
                let (item, rate) = (item_ids()[0], item_rates()[0]);

                assert_eq!(farm.calculate_reward(&signer, &item, 0).expect("calc"), 0);
                farm.deposit(&signer, &item, 1, 1).expect("deposit");
                assert_eq!(farm.calculate_reward(&signer, &item, 8).expect("calc"), 7 * rate);
            }

            #[test]
            fn claim_reward_pays_pending_plus_claim_block() {
                let mut farm = setup($store);
                let signer = signer();
                let (item, rate) = (item_ids()[0], item_rates()[0]);

                farm.deposit(&signer, &item, 1, 1).expect("deposit");
                let expected = farm.calculate_reward(&signer, &item, 8).expect("calc") + rate;
                let before = farm.rewards().balance_of(&signer);
                let paid = farm.claim_reward(&signer, &item, 9).expect("claim");

                assert_eq!(paid, expected);
                assert_eq!(farm.rewards().balance_of(&signer) - before, expected);
            }

            #[test]
            fn claim_reward_resets_pending() {
                let mut farm = setup($store);
                let signer = signer();
                let item = item_ids()[0];

                farm.deposit(&signer, &item, 1, 1).expect("deposit");
                assert_ne!(farm.calculate_reward(&signer, &item, 2).expect("calc"), 0);
                farm.claim_reward(&signer, &item, 3).expect("claim");
                assert_eq!(farm.calculate_reward(&signer, &item, 3).expect("calc"), 0);
            }

            #[test]
            fn deposit_transfers_item_to_pool() {
                let mut farm = setup($store);
                let signer = signer();
                let item = item_ids()[0];

                let (pool_before, user_before) = balances(&farm, &item);
                farm.deposit(&signer, &item, 1, 1).expect("deposit");
                let (pool_after, user_after) = balances(&farm, &item);

                assert_eq!(pool_after, pool_before + 1);
                assert_eq!(user_after, user_before - 1);
            }

            #[test]
            fn zero_deposit_pays_pending() {
                let mut farm = setup($store);
                let signer = signer();
                let (item, rate) = (item_ids()[0], item_rates()[0]);

                farm.deposit(&signer, &item, 1, 1).expect("deposit");
                let expected = farm.calculate_reward(&signer, &item, 8).expect("calc") + rate;
                let paid = farm.deposit(&signer, &item, 0, 9).expect("touch");

                assert_eq!(paid, expected);
                assert_eq!(farm.rewards().balance_of(&signer), expected);
            }

            #[test]
            fn deposit_rejects_amount_above_balance() {
                let mut farm = setup($store);
                let signer = signer();
                let item = item_ids()[0];

                let result = farm.deposit(&signer, &item, 10, 1);
                assert!(matches!(
                    result,
                    Err(FarmError::Custody(CustodyError::InsufficientBalance {
                        requested: 10,
                        available: 1,
                        ..
                    }))
                ));
                assert!(farm.deposits(&signer).expect("deposits").is_empty());
            }

            #[test]
            fn deposit_rejects_without_approval() {
                let mut farm = setup($store);
                let signer = signer();
                let pool = *farm.pool();
                let item = item_ids()[0];

                farm.custody_mut().set_approval_for_all(&signer, &pool, false);
                let result = farm.deposit(&signer, &item, 10, 1);
                assert!(matches!(
                    result,
                    Err(FarmError::Custody(CustodyError::NotApproved { .. }))
                ));
            }

            #[test]
            fn deposit_batch_transfers_item_to_pool() {
                let mut farm = setup($store);
                let signer = signer();
                let item = item_ids()[0];

                let (pool_before, user_before) = balances(&farm, &item);
                farm.deposit_batch(&signer, &[item], &[1], 1).expect("batch");
                let (pool_after, user_after) = balances(&farm, &item);

                assert_eq!(pool_after, pool_before + 1);
                assert_eq!(user_after, user_before - 1);
            }

            #[test]
            fn deposit_batch_zero_pays_pending() {
                let mut farm = setup($store);
                let signer = signer();
                let (item, rate) = (item_ids()[0], item_rates()[0]);

                farm.deposit_batch(&signer, &[item], &[1], 1).expect("batch");
                let expected = farm.calculate_reward(&signer, &item, 8).expect("calc") + rate;
                let paid = farm.deposit_batch(&signer, &[item], &[0], 9).expect("touch");
                assert_eq!(paid, expected);
            }

            #[test]
            fn deposit_batch_rejections() {
                let mut farm = setup($store);
                let signer = signer();
                let pool = *farm.pool();
                let item = item_ids()[0];

                let result = farm.deposit_batch(&signer, &[item], &[10], 1);
                assert!(matches!(
                    result,
                    Err(FarmError::Custody(CustodyError::InsufficientBalance { .. }))
                ));

                farm.custody_mut().set_approval_for_all(&signer, &pool, false);
                let result = farm.deposit_batch(&signer, &[item], &[10], 1);
                assert!(matches!(
                    result,
                    Err(FarmError::Custody(CustodyError::NotApproved { .. }))
                ));
            }

            #[test]
            fn deposit_batch_spans_items() {
                let mut farm = setup($store);
                let signer = signer();
                let ids = item_ids();
                let rates = item_rates();

                farm.deposit_batch(&signer, &ids, &vec![1; ids.len()], 1).expect("batch");
                let mut held = farm.deposits(&signer).expect("deposits");
                let mut expected = ids.clone();
                held.sort();
                expected.sort();
                assert_eq!(held, expected);

                let paid = farm.withdraw_batch(&signer, &ids, &vec![1; ids.len()], 4).expect("batch");
                assert_eq!(paid, rates.iter().map(|rate| 3 * rate).sum::<u128>());
                for item in &ids {
                    assert_eq!(balances(&farm, item), (0, 1));
                }
            }

            #[test]
            fn withdraw_transfers_item_to_signer() {
                let mut farm = setup($store);
                let signer = signer();
                let item = item_ids()[0];

                farm.deposit(&signer, &item, 1, 1).expect("deposit");
                let (pool_before, user_before) = balances(&farm, &item);
                farm.withdraw(&signer, &item, 1, 2).expect("withdraw");
                let (pool_after, user_after) = balances(&farm, &item);

                assert_eq!(pool_after, pool_before - 1);
                assert_eq!(user_after, user_before + 1);
            }

            #[test]
            fn withdraw_pays_pending() {
                let mut farm = setup($store);
                let signer = signer();
                let (item, rate) = (item_ids()[0], item_rates()[0]);

                farm.deposit(&signer, &item, 1, 1).expect("deposit");
                let expected = farm.calculate_reward(&signer, &item, 8).expect("calc") + rate;
                assert_eq!(farm.withdraw(&signer, &item, 1, 9).expect("withdraw"), expected);
            }

            #[test]
            fn withdraw_rejects_amount_above_deposit() {
                let mut farm = setup($store);
                let signer = signer();
                let item = item_ids()[0];

                let result = farm.withdraw(&signer, &item, 1, 1);
                assert!(matches!(result, Err(FarmError::InsufficientPoolBalance { .. })));

                farm.deposit(&signer, &item, 1, 2).expect("deposit");
                let result = farm.withdraw(&signer, &item, 2, 3);
                assert!(matches!(
                    result,
                    Err(FarmError::InsufficientPoolBalance {
                        requested: 2,
                        deposited: 1,
                        ..
                    })
                ));
                assert_eq!(balances(&farm, &item), (1, 0));
            }

            #[test]
            fn withdraw_batch_transfers_and_pays() {
                let mut farm = setup($store);
                let signer = signer();
                let (item, rate) = (item_ids()[0], item_rates()[0]);

                farm.deposit(&signer, &item, 1, 1).expect("deposit");
                let expected = farm.calculate_reward(&signer, &item, 8).expect("calc") + rate;
                let (pool_before, user_before) = balances(&farm, &item);
                let paid = farm.withdraw_batch(&signer, &[item], &[1], 9).expect("batch");
                let (pool_after, user_after) = balances(&farm, &item);

                assert_eq!(paid, expected);
                assert_eq!(pool_after, pool_before - 1);
                assert_eq!(user_after, user_before + 1);
            }

            #[test]
            fn withdraw_batch_rejects_amount_above_deposit() {
                let mut farm = setup($store);
                let signer = signer();
                let item = item_ids()[0];

                let result = farm.withdraw_batch(&signer, &[item], &[1], 1);
                assert!(matches!(result, Err(FarmError::InsufficientPoolBalance { .. })));

                farm.deposit(&signer, &item, 1, 2).expect("deposit");
                let result = farm.withdraw_batch(&signer, &[item], &[2], 3);
                assert!(matches!(result, Err(FarmError::InsufficientPoolBalance { .. })));
                assert_eq!(farm.rewards().total_supply(), 0);
            }
        }
    };
}

farm_suite!(memory_store, harvest_ledger::MemoryPositionStore::new());
farm_suite!(
    sqlite_store,
    harvest_db::SqlitePositionStore::open_memory().expect("open sqlite store")
);
