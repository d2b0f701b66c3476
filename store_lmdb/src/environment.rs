//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use stakeway_types::Clock;

use crate::integrity::{self, IntegrityReport};
use crate::migration;
use crate::{LmdbError, LmdbLedgerStore, LmdbMetaStore};

/// Maximum number of named databases in the environment.
pub const MAX_DBS: u32 = 4;

/// Default memory map size (1 GiB).
pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;

pub(crate) const STAKES_DB: &str = "stakes";
pub(crate) const META_DB: &str = "meta";

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) stakes_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// Creates the directory and both databases if missing, then brings the
    /// schema up to date.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process and the data
        // files are not modified by anything other than this handle.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let stakes_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(STAKES_DB))?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(META_DB))?;
        wtxn.commit()?;

        let environment = Self {
            env: Arc::new(env),
            stakes_db,
            meta_db,
        };

        let version = migration::ensure_schema(&environment.meta_store())?;
        tracing::info!(path = %path.display(), map_size, version, "LMDB environment opened");
        Ok(environment)
    }

    /// A ledger store stamping events with `clock`.
    pub fn ledger_store(&self, clock: Arc<dyn Clock>) -> LmdbLedgerStore {
        LmdbLedgerStore {
            env: Arc::clone(&self.env),
            stakes_db: self.stakes_db,
            meta_db: self.meta_db,
            clock,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }

    /// Flush the memory map to disk.
    pub fn force_sync(&self) -> Result<(), LmdbError> {
        Ok(self.env.force_sync()?)
    }

    /// Scan every database and stake record for damage.
    pub fn check_integrity(&self) -> Result<IntegrityReport, LmdbError> {
        integrity::check_integrity(&self.env, self.stakes_db, self.meta_db)
    }
}
