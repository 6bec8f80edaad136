//! Wire types for the fltik profile API.
//!
//! The upstream payload is loosely shaped: every field is optional, the
//! success flag comes as either a boolean or a literal `"success"` status
//! string, follower counts arrive as JSON numbers or (possibly
//! thousands-separated) strings, and two fields have competing spellings.
//! Everything is modeled as optional here; [`crate::normalize_profile`] turns
//! this into a fully-populated record with a documented precedence order.

use serde::Deserialize;
use serde_json::Value;

/// Raw lookup response body.
#[derive(Debug, Default, Deserialize)]
pub struct ProfilePayload {
    /// Boolean success flag. Some deployments send `"status": "success"`
    /// instead; [`ProfilePayload::is_success`] accepts either.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    /// Upstream error explanation, present on failed lookups.
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, rename = "privateAccount")]
    pub private_account: Option<bool>,

    /// Follower count, preferred spelling. Number or string on the wire.
    #[serde(default)]
    pub followers_count: Option<Value>,
    /// Follower count, legacy spelling.
    #[serde(default)]
    pub followers: Option<Value>,
    #[serde(default)]
    pub following_count: Option<Value>,

    /// Avatar URL, preferred spelling.
    #[serde(default, rename = "profilePic")]
    pub profile_pic: Option<String>,
    /// Avatar URL, legacy spelling.
    #[serde(default, rename = "profile_pic")]
    pub profile_pic_snake: Option<String>,
}

impl ProfilePayload {
    /// True when the payload carries a positive success indicator in either
    /// of the two shapes the API uses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success == Some(true) || self.status.as_deref() == Some("success")
    }

    /// Follower count with field precedence: `followers_count` over `followers`.
    #[must_use]
    pub fn followers_value(&self) -> Option<&Value> {
        self.followers_count.as_ref().or(self.followers.as_ref())
    }

    /// Avatar URL with field precedence: `profilePic` over `profile_pic`.
    /// Empty strings count as absent — an empty URL is not sendable.
    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.profile_pic
            .as_deref()
            .or(self.profile_pic_snake.as_deref())
            .filter(|s| !s.is_empty())
    }
}
