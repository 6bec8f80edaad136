//! Persisted watch state: a flat JSON map of username to last-observed values.
//!
//! The file is read whole at cycle start and replaced whole at cycle end —
//! a single-writer discipline the scheduler enforces; no finer-grained
//! transactional guarantees are needed or provided.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tikwatch_profile::Count;

/// Last-observed values for one watched username. No history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub followers_count: Count,
    pub bio: String,
    pub checked_at: DateTime<Utc>,
}

/// The whole state file, keyed by username. `BTreeMap` keeps the on-disk
/// ordering stable across rewrites.
pub type WatchState = BTreeMap<String, WatchEntry>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write state file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {path} is corrupt: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the watch state from disk.
///
/// A missing file is a fresh start and yields an empty map; an unreadable or
/// corrupt file is an error the caller must see — silently discarding state
/// would fire a spurious baseline cycle.
///
/// # Errors
///
/// Returns [`StateError::Read`] on I/O failure other than not-found, or
/// [`StateError::Parse`] when the file is not a valid state map.
pub fn load_state(path: &Path) -> Result<WatchState, StateError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(WatchState::new()),
        Err(e) => {
            return Err(StateError::Read {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    serde_json::from_str(&content).map_err(|e| StateError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Persist the watch state, replacing the file wholesale.
///
/// Writes to a sibling temp file and renames over the target so a crash
/// mid-write never leaves a truncated state file. Parent directories are
/// created on first save.
///
/// # Errors
///
/// Returns [`StateError::Write`] on any I/O failure.
pub fn save_state(path: &Path, state: &WatchState) -> Result<(), StateError> {
    let write_err = |source: std::io::Error| StateError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let serialized =
        serde_json::to_string_pretty(state).map_err(|e| StateError::Write {
            path: path.display().to_string(),
            source: std::io::Error::other(e),
        })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serialized).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)?;

    Ok(())
}
