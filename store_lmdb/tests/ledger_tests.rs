//! LMDB ledger store tests: append, aggregate, durability across reopen,
//! and concurrent writers.

use std::sync::Arc;

use stakeway_nullables::NullClock;
use stakeway_store::{LedgerStore, MetaStore, StoreError};
use stakeway_store_lmdb::environment::DEFAULT_MAP_SIZE;
use stakeway_store_lmdb::LmdbEnvironment;
use stakeway_types::{StakeAmount, StakeId, Timestamp};

const WALLET: &str = "0x1234567890abcdef1234567890abcdef12345678";
const OTHER: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).expect("open env");
    (dir, env)
}

fn tokens(n: u64) -> StakeAmount {
    StakeAmount::from_tokens(n)
}

// ---------------------------------------------------------------------------
// Append and aggregate
// ---------------------------------------------------------------------------

#[test]
fn unknown_wallet_totals_zero() {
    let (_dir, env) = temp_env();
    let store = env.ledger_store(Arc::new(NullClock::new(0)));
    assert_eq!(store.total_staked(WALLET).unwrap(), StakeAmount::ZERO);
    assert_eq!(store.total_staked("").unwrap(), StakeAmount::ZERO);
}

#[test]
fn totals_sum_each_recorded_event() {
    let (_dir, env) = temp_env();
    let store = env.ledger_store(Arc::new(NullClock::new(0)));

    store.record_stake(WALLET, tokens(100)).unwrap();
    assert_eq!(store.total_staked(WALLET).unwrap(), tokens(100));

    store.record_stake(WALLET, tokens(50)).unwrap();
    assert_eq!(store.total_staked(WALLET).unwrap(), tokens(150));

    store.record_stake(WALLET, StakeAmount::ZERO).unwrap();
    assert_eq!(store.total_staked(WALLET).unwrap(), tokens(150));
    assert_eq!(store.stake_count().unwrap(), 3);
}

#[test]
fn wallets_do_not_share_totals() {
    let (_dir, env) = temp_env();
    let store = env.ledger_store(Arc::new(NullClock::new(0)));

    store.record_stake(WALLET, tokens(10)).unwrap();
    store.record_stake(OTHER, tokens(7)).unwrap();
    // A wallet that is a string prefix of another must not pick up its events.
    store.record_stake("0x12", tokens(1)).unwrap();

    assert_eq!(store.total_staked(WALLET).unwrap(), tokens(10));
    assert_eq!(store.total_staked(OTHER).unwrap(), tokens(7));
    assert_eq!(store.total_staked("0x12").unwrap(), tokens(1));
}

#[test]
fn events_get_increasing_ids_and_store_timestamps() {
    let (_dir, env) = temp_env();
    let clock = Arc::new(NullClock::new(1_700_000_000));
    let store = env.ledger_store(clock.clone());

    let first = store.record_stake(WALLET, tokens(1)).unwrap();
    clock.advance(30);
    let second = store.record_stake(OTHER, tokens(2)).unwrap();

    assert_eq!(first.id, StakeId::FIRST);
    assert!(second.id > first.id);
    assert_eq!(first.recorded_at, Timestamp::new(1_700_000_000));
    assert_eq!(second.recorded_at, Timestamp::new(1_700_000_030));
    assert_eq!(second.wallet_address, OTHER);
}

#[test]
fn empty_wallet_is_rejected_without_writing() {
    let (_dir, env) = temp_env();
    let store = env.ledger_store(Arc::new(NullClock::new(0)));

    let err = store.record_stake("", tokens(1)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));
    assert_eq!(store.stake_count().unwrap(), 0);
}

#[test]
fn oversized_wallet_is_invalid_argument() {
    let (_dir, env) = temp_env();
    let store = env.ledger_store(Arc::new(NullClock::new(0)));
    let huge = format!("0x{}", "a".repeat(598));

    let err = store.record_stake(&huge, tokens(1)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)), "{err:?}");
    assert_eq!(store.total_staked(&huge).unwrap(), StakeAmount::ZERO);
    assert_eq!(store.stake_count().unwrap(), 0);

    // The id counter did not move either.
    let event = store.record_stake(WALLET, tokens(1)).unwrap();
    assert_eq!(event.id, StakeId::FIRST);
}

// ---------------------------------------------------------------------------
// Durability
// ---------------------------------------------------------------------------

#[test]
fn events_survive_reopen_and_ids_continue() {
    let dir = tempfile::tempdir().unwrap();

    let last_id = {
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        let store = env.ledger_store(Arc::new(NullClock::new(0)));
        store.record_stake(WALLET, tokens(100)).unwrap();
        store.record_stake(WALLET, tokens(50)).unwrap().id
    };

    let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
    let store = env.ledger_store(Arc::new(NullClock::new(0)));
    assert_eq!(store.total_staked(WALLET).unwrap(), tokens(150));

    let next = store.record_stake(WALLET, tokens(1)).unwrap();
    assert!(next.id > last_id);
}

#[test]
fn fresh_environment_is_stamped_current_schema() {
    let (_dir, env) = temp_env();
    assert_eq!(
        env.meta_store().get_schema_version().unwrap(),
        stakeway_store_lmdb::migration::CURRENT_SCHEMA_VERSION
    );
}

#[test]
fn newer_schema_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    {
        let env = LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();
        env.meta_store().set_schema_version(99).unwrap();
    }
    assert!(LmdbEnvironment::open(dir.path(), DEFAULT_MAP_SIZE).is_err());
}

#[test]
fn integrity_check_counts_records() {
    let (_dir, env) = temp_env();
    let store = env.ledger_store(Arc::new(NullClock::new(0)));
    store.record_stake(WALLET, tokens(1)).unwrap();
    store.record_stake(WALLET, tokens(2)).unwrap();
    store.record_stake(OTHER, tokens(3)).unwrap();

    let report = env.check_integrity().unwrap();
    assert!(report.is_healthy(), "{:?}", report.errors);
    assert_eq!(report.databases_checked, 2);
    assert_eq!(report.stake_records, 3);
    assert_eq!(report.wallets, 2);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_writers_lose_nothing() {
    const WRITERS: u64 = 16;
    const PER_WRITER: u64 = 8;

    let (_dir, env) = temp_env();
    let store = Arc::new(env.ledger_store(Arc::new(NullClock::new(0))));

    std::thread::scope(|scope| {
        for _ in 0..WRITERS {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for _ in 0..PER_WRITER {
                    store.record_stake(WALLET, tokens(1)).unwrap();
                    // Interleave reads; each must be a whole number of events.
                    let total = store.total_staked(WALLET).unwrap();
                    assert_eq!(total.raw() % StakeAmount::RAW_PER_TOKEN, 0);
                }
            });
        }
    });

    assert_eq!(
        store.total_staked(WALLET).unwrap(),
        tokens(WRITERS * PER_WRITER)
    );
    assert_eq!(store.stake_count().unwrap(), WRITERS * PER_WRITER);
}
