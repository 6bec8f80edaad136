use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::LookupError;
use crate::normalize::{normalize_profile, ProfileRecord};
use crate::types::ProfilePayload;

const DEFAULT_BASE_URL: &str = "https://ahihi.x10.mx/fltik.php";
const DEFAULT_USER_AGENT: &str = "tikwatch/0.1 (profile-watch)";

/// Client for the fltik profile-lookup API.
///
/// Holds one shared `reqwest::Client` (connection pool reused across calls,
/// safe for concurrent use), the API key, and the endpoint URL. Use
/// [`ProfileClient::new`] for production or [`ProfileClient::with_base_url`]
/// to point at a mock server in tests.
pub struct ProfileClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl ProfileClient {
    /// Creates a new client pointed at the production endpoint.
    ///
    /// `timeout_secs` bounds the total time of each lookup, connect included.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Network`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, LookupError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL, DEFAULT_USER_AGENT)
    }

    /// Creates a new client with a custom endpoint URL and user agent
    /// (for testing with wiremock, or alternate deployments of the API).
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Network`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`LookupError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
        user_agent: &str,
    ) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(LookupError::from_transport)?;

        let base_url = Url::parse(base_url).map_err(|e| LookupError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Resolves a username into a [`ProfileRecord`].
    ///
    /// Issues exactly one GET — no automatic retries; a failed attempt
    /// surfaces immediately and retry policy stays with the caller.
    ///
    /// # Errors
    ///
    /// - [`LookupError::EmptyUsername`] for empty/whitespace input.
    /// - [`LookupError::Timeout`] / [`LookupError::Network`] on transport failure.
    /// - [`LookupError::UpstreamStatus`] when the API answers non-200.
    /// - [`LookupError::MalformedResponse`] when the body is not JSON.
    /// - [`LookupError::NotFound`] when the payload carries no success flag.
    pub async fn lookup(&self, username: &str) -> Result<ProfileRecord, LookupError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LookupError::EmptyUsername);
        }

        let url = self.build_url(username);
        tracing::debug!(username, "looking up profile");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(LookupError::from_transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        // Read the body as text first so a timeout mid-body still classifies
        // as a transport failure rather than a parse failure.
        let body = response
            .text()
            .await
            .map_err(LookupError::from_transport)?;

        let payload: ProfilePayload = serde_json::from_str(&body)
            .map_err(|e| LookupError::MalformedResponse { source: e })?;

        if !payload.is_success() {
            let message = payload
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "user not found or upstream error".to_string());
            return Err(LookupError::NotFound { message });
        }

        Ok(normalize_profile(&payload, username))
    }

    /// Builds the request URL with properly percent-encoded query parameters:
    /// `<base>?user=<username>&key=<apiKey>`.
    fn build_url(&self, username: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("user", username)
            .append_pair("key", &self.api_key);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> ProfileClient {
        ProfileClient::with_base_url("test-key", 30, base_url, "tikwatch-test")
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_constructs_correct_query_string() {
        let client = test_client("https://ahihi.x10.mx/fltik.php");
        let url = client.build_url("khangdino206");
        assert_eq!(
            url.as_str(),
            "https://ahihi.x10.mx/fltik.php?user=khangdino206&key=test-key"
        );
    }

    #[test]
    fn build_url_encodes_special_characters() {
        let client = test_client("https://ahihi.x10.mx/fltik.php");
        let url = client.build_url("user name&x");
        assert!(
            url.as_str().contains("user+name%26x") || url.as_str().contains("user%20name%26x"),
            "query param should be percent-encoded: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected_at_construction() {
        let result = ProfileClient::with_base_url("k", 5, "not a url", "ua");
        assert!(result.is_err());
    }
}
