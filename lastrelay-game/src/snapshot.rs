//! Lossless snapshot encoding with invariant checks on restore.

use std::collections::BTreeSet;
use std::hash::Hasher;

use thiserror::Error;
use twox_hash::XxHash64;

use crate::constants::{RESOURCE_MAX, RESOURCE_MIN};
use crate::data::SubsystemName;
use crate::state::GameState;

const MIN_ROSTER: usize = 3;
const MAX_ROSTER: usize = 5;

/// Reasons a snapshot cannot be restored.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("roster size {0} is outside 3..=5")]
    RosterSize(usize),
    #[error("roster is missing mandatory subsystem {0}")]
    MissingMandatory(SubsystemName),
    #[error("roster lists {0} more than once")]
    DuplicateRoster(SubsystemName),
    #[error("roster and subsystem map disagree")]
    RosterMismatch,
    #[error("subsystem entry {key} describes {found} with quirk {quirk}")]
    InconsistentSubsystem {
        key: SubsystemName,
        found: SubsystemName,
        quirk: &'static str,
    },
    #[error("{field} must be between 0 and 100 (got {value})")]
    ResourceOutOfRange { field: &'static str, value: i32 },
    #[error("ended flag and ending text disagree")]
    EndingMismatch,
    #[error("turn counter must start at 1")]
    ZeroTurn,
}

impl GameState {
    /// Encode the state as JSON.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Decode` if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a state from JSON, rejecting snapshots that break invariants.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` for malformed JSON or any invariant violation.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let state: Self = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    /// Check the structural invariants every live state satisfies.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let len = self.roster.len();
        if !(MIN_ROSTER..=MAX_ROSTER).contains(&len) {
            return Err(SnapshotError::RosterSize(len));
        }
        for mandatory in SubsystemName::MANDATORY {
            if !self.roster.contains(&mandatory) {
                return Err(SnapshotError::MissingMandatory(mandatory));
            }
        }
        let mut seen = BTreeSet::new();
        for name in &self.roster {
            if !seen.insert(*name) {
                return Err(SnapshotError::DuplicateRoster(*name));
            }
        }
        if !seen.iter().eq(self.subsystems.keys()) {
            return Err(SnapshotError::RosterMismatch);
        }
        for (key, sub) in &self.subsystems {
            if sub.name != *key || sub.quirk.owner() != *key {
                return Err(SnapshotError::InconsistentSubsystem {
                    key: *key,
                    found: sub.name,
                    quirk: sub.quirk.name(),
                });
            }
        }
        for (field, value) in [
            ("power", self.power),
            ("integrity", self.integrity),
            ("focus", self.focus),
        ] {
            if !(RESOURCE_MIN..=RESOURCE_MAX).contains(&value) {
                return Err(SnapshotError::ResourceOutOfRange { field, value });
            }
        }
        if self.ended != self.ending.is_some() {
            return Err(SnapshotError::EndingMismatch);
        }
        if self.turn == 0 {
            return Err(SnapshotError::ZeroTurn);
        }
        Ok(())
    }

    /// Stable 64-bit digest of the canonical JSON form.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        if let Ok(bytes) = serde_json::to_vec(self) {
            hasher.write(&bytes);
        }
        hasher.finish()
    }
}
