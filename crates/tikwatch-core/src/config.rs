use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("TIKWATCH_ENV", "development"));

    let bind_addr = parse_addr("TIKWATCH_BIND_ADDR", "0.0.0.0:8080")?;
    let log_level = or_default("TIKWATCH_LOG_LEVEL", "info");

    let api_base_url = or_default("TIKWATCH_API_BASE_URL", "https://ahihi.x10.mx/fltik.php");
    // The upstream service ships with a shared default key; deployments
    // override it with their own.
    let api_key = or_default("TIKWATCH_API_KEY", "khang");

    let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN").ok();
    let notify_chat_id = match lookup("TIKWATCH_NOTIFY_CHAT_ID") {
        Ok(raw) => Some(
            raw.parse::<i64>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "TIKWATCH_NOTIFY_CHAT_ID".to_string(),
                    reason: e.to_string(),
                })?,
        ),
        Err(_) => None,
    };

    let watchlist_path = PathBuf::from(or_default(
        "TIKWATCH_WATCHLIST_PATH",
        "./config/watchlist.yaml",
    ));
    let state_path = PathBuf::from(or_default("TIKWATCH_STATE_PATH", "./data/watch_state.json"));

    let request_timeout_secs = parse_u64("TIKWATCH_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("TIKWATCH_USER_AGENT", "tikwatch/0.1 (profile-watch)");
    let watch_interval_secs = parse_u64("TIKWATCH_WATCH_INTERVAL_SECS", "300")?;
    let max_concurrent_lookups = parse_usize("TIKWATCH_MAX_CONCURRENT_LOOKUPS", "4")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_base_url,
        api_key,
        telegram_bot_token,
        notify_chat_id,
        watchlist_path,
        state_path,
        request_timeout_secs,
        user_agent,
        watch_interval_secs,
        max_concurrent_lookups,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
