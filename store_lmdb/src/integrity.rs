//! LMDB database integrity checks.
//!
//! Run on startup (and by `stakeway-daemon check-db`) to detect corruption
//! early, before the service begins accepting stakes.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use stakeway_types::StakeEvent;

use crate::environment::{META_DB, STAKES_DB};
use crate::ledger::{decode_stake_key, read_next_id};
use crate::LmdbError;

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    /// Stake records that decoded cleanly.
    pub stake_records: u64,
    /// Distinct wallets with at least one stake.
    pub wallets: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Database names that we expect to exist in a valid Stakeway environment.
const EXPECTED_DATABASES: &[&str] = &[STAKES_DB, META_DB];

/// Check LMDB database integrity.
///
/// Opens each expected database and counts entries, then decodes every
/// stake record and checks it against its key and the id counter. Read and
/// decode failures are recorded in the report rather than causing a hard error.
pub fn check_integrity(
    env: &Arc<Env>,
    stakes_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();

    let rtxn = env.read_txn().map_err(LmdbError::from)?;

    for &db_name in EXPECTED_DATABASES {
        match env.open_database::<Bytes, Bytes>(&rtxn, Some(db_name)) {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => report.total_entries += count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{}': {}", db_name, e)),
                }
            }
            Ok(None) => report
                .errors
                .push(format!("database '{}' is missing", db_name)),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{}': {}", db_name, e)),
        }
    }

    let next_id = match read_next_id(&meta_db, &rtxn) {
        Ok(id) => Some(id),
        Err(e) => {
            report.errors.push(e.to_string());
            None
        }
    };

    let iter = stakes_db.iter(&rtxn).map_err(LmdbError::from)?;
    let mut last_wallet: Option<Vec<u8>> = None;
    for item in iter {
        let (key, val) = match item {
            Ok(kv) => kv,
            Err(e) => {
                report.errors.push(format!("failed to read stake: {}", e));
                continue;
            }
        };
        let Some((wallet, id)) = decode_stake_key(key) else {
            report
                .errors
                .push(format!("malformed stake key ({} bytes)", key.len()));
            continue;
        };
        let event: StakeEvent = match bincode::deserialize(val) {
            Ok(event) => event,
            Err(e) => {
                report
                    .errors
                    .push(format!("stake {} failed to decode: {}", id, e));
                continue;
            }
        };
        if event.id != id || event.wallet_address.as_bytes() != wallet {
            report
                .errors
                .push(format!("stake {} does not match its key", id));
        }
        if next_id.is_some_and(|next| id >= next) {
            report
                .errors
                .push(format!("stake {} is at or past the id counter", id));
        }
        if last_wallet.as_deref() != Some(wallet) {
            report.wallets += 1;
            last_wallet = Some(wallet.to_vec());
        }
        report.stake_records += 1;
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_data_dir_fresh_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(&dir.path().join("not-yet-created")).is_ok());
    }

    #[test]
    fn check_data_dir_without_data_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(dir.path()).is_err());
    }

    #[test]
    fn unhealthy_report() {
        let report = IntegrityReport {
            errors: vec!["corruption detected".to_string()],
            ..Default::default()
        };
        assert!(!report.is_healthy());
    }
}
