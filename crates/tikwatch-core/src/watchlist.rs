use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One watched identity from the watch-list file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchUser {
    pub username: String,
    /// Optional operator-facing label shown alongside the username in logs.
    pub label: Option<String>,
}

/// The watch-list file: an ordered list of usernames to poll.
///
/// Order is preserved — the watch cycle resolves and reports identities in
/// file order.
#[derive(Debug, Deserialize)]
pub struct WatchList {
    pub watch: Vec<WatchUser>,
}

/// Load and validate the watch-list from a YAML file.
///
/// Usernames are canonicalized before validation: surrounding whitespace and
/// a leading `@` are stripped (people paste handles both ways).
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_watch_list(path: &Path) -> Result<WatchList, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::WatchListIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut list: WatchList = serde_yaml::from_str(&content)?;

    for user in &mut list.watch {
        user.username = canonicalize_username(&user.username);
    }

    validate_watch_list(&list)?;

    Ok(list)
}

/// Strip surrounding whitespace and a leading `@` from a pasted handle.
#[must_use]
pub fn canonicalize_username(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_string()
}

fn validate_watch_list(list: &WatchList) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for user in &list.watch {
        if user.username.is_empty() {
            return Err(ConfigError::Validation(
                "watched username must be non-empty".to_string(),
            ));
        }

        if user.username.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "watched username '{}' must not contain whitespace",
                user.username
            )));
        }

        if !seen.insert(user.username.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate watched username: '{}'",
                user.username
            )));
        }
    }

    Ok(())
}
