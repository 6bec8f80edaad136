mod app_config;
mod config;
mod watchlist;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use watchlist::{canonicalize_username, load_watch_list, WatchList, WatchUser};

/// Errors raised while loading configuration or the watch-list file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read watch-list file {path}: {source}")]
    WatchListIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse watch-list file: {0}")]
    WatchListParse(#[from] serde_yaml::Error),

    #[error("watch-list validation failed: {0}")]
    Validation(String),
}
