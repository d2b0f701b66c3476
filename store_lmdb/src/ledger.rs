//! LMDB implementation of LedgerStore.
//!
//! Key format: `u16 BE wallet length ++ wallet bytes ++ u64 BE stake id`.
//! The length prefix keeps per-wallet prefix scans exact even though the
//! store accepts wallets of any length, and the big-endian id keeps each
//! wallet's events in insertion order.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use stakeway_store::{check_wallet_key, LedgerStore, StoreError};
use stakeway_types::{Clock, StakeAmount, StakeEvent, StakeId};

use crate::LmdbError;

/// Meta key holding the next id to hand out (u64 LE).
pub(crate) const NEXT_STAKE_ID_KEY: &[u8] = b"next_stake_id";

pub struct LmdbLedgerStore {
    pub(crate) env: Arc<Env>,
    pub(crate) stakes_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
    pub(crate) clock: Arc<dyn Clock>,
}

/// Build the `len ++ wallet` prefix shared by all of a wallet's keys.
fn wallet_prefix(wallet_address: &str) -> Option<Vec<u8>> {
    let wallet = wallet_address.as_bytes();
    let len = u16::try_from(wallet.len()).ok()?;
    let mut prefix = Vec::with_capacity(2 + wallet.len() + 8);
    prefix.extend_from_slice(&len.to_be_bytes());
    prefix.extend_from_slice(wallet);
    Some(prefix)
}

fn stake_key(wallet_address: &str, id: StakeId) -> Result<Vec<u8>, StoreError> {
    let mut key = wallet_prefix(wallet_address).ok_or_else(|| {
        StoreError::InvalidArgument(format!(
            "wallet address longer than {} bytes",
            u16::MAX
        ))
    })?;
    key.extend_from_slice(&id.get().to_be_bytes());
    Ok(key)
}

/// Split a stake key back into its wallet bytes and id.
pub(crate) fn decode_stake_key(key: &[u8]) -> Option<(&[u8], StakeId)> {
    let len = u16::from_be_bytes(key.get(..2)?.try_into().ok()?) as usize;
    let wallet = key.get(2..2 + len)?;
    let id_bytes: [u8; 8] = key.get(2 + len..)?.try_into().ok()?;
    Some((wallet, StakeId::new(u64::from_be_bytes(id_bytes))))
}

/// Read the next stake id from the meta database; a fresh ledger starts at 1.
pub(crate) fn read_next_id(
    meta_db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
) -> Result<StakeId, StoreError> {
    match meta_db.get(txn, NEXT_STAKE_ID_KEY).map_err(LmdbError::from)? {
        Some(bytes) => {
            let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                StoreError::Corruption("next_stake_id has unexpected byte length".to_string())
            })?;
            Ok(StakeId::new(u64::from_le_bytes(arr)))
        }
        None => Ok(StakeId::FIRST),
    }
}

impl LmdbLedgerStore {
    /// Whether a full stake key for this wallet fits LMDB's key size limit.
    fn key_fits(&self, wallet_address: &str) -> bool {
        2 + wallet_address.len() + 8 <= self.env.max_key_size()
    }
}

impl LedgerStore for LmdbLedgerStore {
    fn record_stake(
        &self,
        wallet_address: &str,
        amount: StakeAmount,
    ) -> Result<StakeEvent, StoreError> {
        check_wallet_key(wallet_address)?;
        if !self.key_fits(wallet_address) {
            return Err(StoreError::InvalidArgument(format!(
                "wallet address of {} bytes exceeds the LMDB key limit",
                wallet_address.len()
            )));
        }

        // The id counter and the event share one write transaction, so a
        // failed commit leaves neither behind.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = read_next_id(&self.meta_db, &wtxn)?;
        let next = id
            .next()
            .ok_or_else(|| StoreError::Overflow("stake id space exhausted".to_string()))?;

        let event = StakeEvent {
            id,
            wallet_address: wallet_address.to_string(),
            amount,
            recorded_at: self.clock.now(),
        };
        let key = stake_key(wallet_address, id)?;
        let bytes = bincode::serialize(&event).map_err(LmdbError::from)?;

        self.stakes_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, NEXT_STAKE_ID_KEY, &next.get().to_le_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::trace!(id = %event.id, wallet = wallet_address, amount = %amount, "stake recorded");
        Ok(event)
    }

    fn total_staked(&self, wallet_address: &str) -> Result<StakeAmount, StoreError> {
        // No key this long can have been written.
        if !self.key_fits(wallet_address) {
            return Ok(StakeAmount::ZERO);
        }
        let Some(prefix) = wallet_prefix(wallet_address) else {
            return Ok(StakeAmount::ZERO);
        };

        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .stakes_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;

        let mut total = StakeAmount::ZERO;
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let event: StakeEvent = bincode::deserialize(val).map_err(LmdbError::from)?;
            total = total.checked_add(event.amount).ok_or_else(|| {
                StoreError::Overflow(format!("total staked for {wallet_address}"))
            })?;
        }
        Ok(total)
    }

    fn stake_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.stakes_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
