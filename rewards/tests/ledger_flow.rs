//! End-to-end reward flow over the real LMDB ledger:
//! validation → append → aggregate → reward.

use std::sync::Arc;

use proptest::prelude::*;

use stakeway_nullables::{NullClock, NullLedgerStore};
use stakeway_rewards::{reward_for, RewardEngine, StakeService};
use stakeway_store_lmdb::environment::DEFAULT_MAP_SIZE;
use stakeway_store_lmdb::{LmdbEnvironment, LmdbLedgerStore};
use stakeway_types::StakeAmount;

const WALLET: &str = "0xabcabcabcabcabcabcabcabcabcabcabcabcabca";

fn lmdb_engine() -> (tempfile::TempDir, RewardEngine<LmdbLedgerStore>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).expect("open env");
    let engine = RewardEngine::new(env.ledger_store(Arc::new(NullClock::new(0))));
    (dir, engine)
}

#[test]
fn stake_then_rewards_over_lmdb() {
    let (_dir, engine) = lmdb_engine();
    engine.stake(WALLET, 100.0).unwrap();
    assert_eq!(engine.get_rewards(WALLET).unwrap().to_decimal(), 5.0);
    engine.stake(WALLET, 50.0).unwrap();
    assert_eq!(engine.get_rewards(WALLET).unwrap().to_decimal(), 7.5);
}

#[test]
fn concurrent_stakes_are_all_counted() {
    const N: u64 = 64;

    let (_dir, engine) = lmdb_engine();
    let engine = Arc::new(engine);

    std::thread::scope(|scope| {
        for _ in 0..N {
            let engine = Arc::clone(&engine);
            scope.spawn(move || engine.stake(WALLET, 1.0).unwrap());
        }
    });

    assert_eq!(
        engine.total_staked(WALLET).unwrap(),
        StakeAmount::from_tokens(N)
    );
}

#[test]
fn engine_works_behind_a_trait_object() {
    let (_dir, engine) = lmdb_engine();
    let service: Arc<dyn StakeService> = Arc::new(engine);
    service.stake(WALLET, 20.0).unwrap();
    assert_eq!(service.get_rewards(WALLET).unwrap(), StakeAmount::from_tokens(1));
}

proptest! {
    /// Each successful stake raises the total by exactly the converted amount,
    /// and rewards always track the total.
    #[test]
    fn stake_raises_total_by_amount(amounts in prop::collection::vec(0.0f64..1e9, 1..20)) {
        let engine = RewardEngine::new(NullLedgerStore::new());
        for amount in amounts {
            let before = engine.total_staked(WALLET).unwrap();
            engine.stake(WALLET, amount).unwrap();
            let after = engine.total_staked(WALLET).unwrap();
            prop_assert_eq!(
                after.raw() - before.raw(),
                StakeAmount::from_decimal(amount).unwrap().raw()
            );
            prop_assert_eq!(engine.get_rewards(WALLET).unwrap(), reward_for(after));
        }
    }

    /// Negative amounts never create events.
    #[test]
    fn negative_amounts_never_recorded(amount in -1e12f64..-1e-6) {
        let engine = RewardEngine::new(NullLedgerStore::new());
        prop_assert!(engine.stake(WALLET, amount).is_err());
        prop_assert_eq!(engine.store().calls(), 0);
    }
}
