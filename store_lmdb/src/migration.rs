//! Schema versioning for the stakes environment.
//!
//! Version 1 is the only layout so far:
//! - `stakes`: key `u16 BE wallet length ++ wallet ++ u64 BE id`, value a
//!   bincode `StakeEvent`.
//! - `meta`: `next_stake_id` (u64 LE) and `schema_version` (u32 LE).
//!
//! A brand-new environment reads as version 0 and is stamped with the current
//! version. Each later layout change appends one entry to [`UPGRADES`].

use stakeway_store::MetaStore;

use crate::LmdbError;

/// The layout this build reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Upgrade from `target - 1` to `target`.
struct Upgrade {
    target: u32,
    summary: &'static str,
    apply: fn() -> Result<(), LmdbError>,
}

/// Ordered by `target`, one entry per version.
const UPGRADES: &[Upgrade] = &[Upgrade {
    target: 1,
    summary: "create stakes and meta databases",
    // Both databases are created when the environment opens; nothing to move.
    apply: || Ok(()),
}];

fn upgrade_to(target: u32) -> Result<&'static Upgrade, LmdbError> {
    UPGRADES
        .iter()
        .find(|u| u.target == target)
        .ok_or_else(|| LmdbError::Schema(format!("no upgrade path to schema v{target}")))
}

/// Bring the stored schema to [`CURRENT_SCHEMA_VERSION`] and return it.
///
/// Refuses an environment stamped by a newer release rather than guessing at
/// its layout.
pub fn ensure_schema(meta_store: &impl MetaStore) -> Result<u32, LmdbError> {
    let stored = meta_store
        .get_schema_version()
        .map_err(|e| LmdbError::Schema(e.to_string()))?;

    if stored > CURRENT_SCHEMA_VERSION {
        return Err(LmdbError::Schema(format!(
            "ledger schema v{stored} was written by a newer release (this build reads v{CURRENT_SCHEMA_VERSION})"
        )));
    }

    for target in stored + 1..=CURRENT_SCHEMA_VERSION {
        let upgrade = upgrade_to(target)?;
        tracing::info!(target, summary = upgrade.summary, "upgrading ledger schema");
        (upgrade.apply)()?;
    }

    if stored != CURRENT_SCHEMA_VERSION {
        meta_store
            .set_schema_version(CURRENT_SCHEMA_VERSION)
            .map_err(|e| LmdbError::Schema(e.to_string()))?;
    }
    Ok(CURRENT_SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_version_has_an_upgrade() {
        for target in 1..=CURRENT_SCHEMA_VERSION {
            assert!(upgrade_to(target).is_ok(), "missing upgrade to v{target}");
        }
    }

    #[test]
    fn unknown_target_is_schema_error() {
        assert!(matches!(upgrade_to(99), Err(LmdbError::Schema(_))));
    }
}
