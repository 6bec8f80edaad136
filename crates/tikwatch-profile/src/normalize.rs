//! Normalization of the raw fltik payload into a display-ready record.
//!
//! The wire layer ([`crate::types`]) keeps every field optional and every
//! count untyped; this module pins down the precedence order and the
//! placeholder rules so callers never special-case an absent key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ProfilePayload;

/// A follower/following count as observed upstream.
///
/// Counts arrive as JSON numbers, plain digit strings, or thousands-separated
/// strings. [`Count::parse`] strips `,` and `.` separators before parsing;
/// when the value still is not an integer (the API has been seen returning
/// `"N/A"`), the raw text is carried through unchanged rather than failing
/// the whole lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Exact(i64),
    Raw(String),
}

impl Count {
    /// Parse a wire count value. Absent fields (`None`) default to zero.
    #[must_use]
    pub fn parse(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Count::Exact(0),
            Some(Value::Number(n)) => n
                .as_i64()
                .map_or_else(|| Count::Raw(n.to_string()), Count::Exact),
            Some(Value::String(s)) => {
                let stripped: String = s.chars().filter(|c| *c != ',' && *c != '.').collect();
                stripped
                    .parse::<i64>()
                    .map_or_else(|_| Count::Raw(s.clone()), Count::Exact)
            }
            Some(other) => Count::Raw(other.to_string()),
        }
    }
}

impl std::fmt::Display for Count {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Count::Exact(n) => write!(f, "{n}"),
            Count::Raw(s) => write!(f, "{s}"),
        }
    }
}

/// The normalized result of a successful lookup.
///
/// Constructed only from a validated success payload — a failed or malformed
/// response becomes a [`crate::LookupError`], never a partially-filled record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRecord {
    /// Canonical handle as reported upstream; may differ in case from the query.
    pub username: String,
    pub nickname: String,
    pub region: String,
    pub follower_count: Count,
    pub following_count: Count,
    pub bio: String,
    pub is_private: bool,
    /// `None` means no avatar is sendable.
    pub avatar_url: Option<String>,
}

impl ProfileRecord {
    /// Public profile URL for the record's canonical handle.
    #[must_use]
    pub fn profile_url(&self) -> String {
        format!("https://www.tiktok.com/@{}", self.username)
    }
}

/// Placeholder for absent optional text fields.
const PLACEHOLDER: &str = "N/A";

/// Normalize a validated success payload into a [`ProfileRecord`].
///
/// `queried_username` backfills the handle when the payload omits it, so the
/// record always names an identity the caller recognizes.
#[must_use]
pub fn normalize_profile(payload: &ProfilePayload, queried_username: &str) -> ProfileRecord {
    let username = payload
        .username
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            if queried_username.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                queried_username.to_string()
            }
        });

    let text_or_placeholder =
        |field: &Option<String>| field.clone().unwrap_or_else(|| PLACEHOLDER.to_string());

    ProfileRecord {
        username,
        nickname: text_or_placeholder(&payload.nickname),
        region: text_or_placeholder(&payload.region),
        follower_count: Count::parse(payload.followers_value()),
        following_count: Count::parse(payload.following_count.as_ref()),
        bio: payload.bio.clone().unwrap_or_default(),
        is_private: payload.private_account.unwrap_or(false),
        avatar_url: payload.avatar_url().map(str::to_string),
    }
}
