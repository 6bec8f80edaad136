use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub api_base_url: String,
    pub api_key: String,
    pub telegram_bot_token: Option<String>,
    pub notify_chat_id: Option<i64>,
    pub watchlist_path: PathBuf,
    pub state_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub watch_interval_secs: u64,
    pub max_concurrent_lookups: usize,
}

impl AppConfig {
    /// Returns the Telegram bot token, or the missing-variable error for the
    /// paths that cannot run without one (webhook server, `--notify`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `TELEGRAM_BOT_TOKEN` is unset.
    pub fn require_bot_token(&self) -> Result<&str, crate::ConfigError> {
        self.telegram_bot_token
            .as_deref()
            .ok_or_else(|| crate::ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"[redacted]")
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "[redacted]"),
            )
            .field("notify_chat_id", &self.notify_chat_id)
            .field("watchlist_path", &self.watchlist_path)
            .field("state_path", &self.state_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("watch_interval_secs", &self.watch_interval_secs)
            .field("max_concurrent_lookups", &self.max_concurrent_lookups)
            .finish()
    }
}
