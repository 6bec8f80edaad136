//! Outbound delivery to Telegram and all user-facing message formatting.
//!
//! The rest of the system hands this crate plain data — a [`ProfileRecord`],
//! a [`ChangeEvent`], a [`LookupError`] — and gets exactly one terminal
//! message per interaction out the other side.
//!
//! [`ProfileRecord`]: tikwatch_profile::ProfileRecord
//! [`ChangeEvent`]: tikwatch_monitor::ChangeEvent
//! [`LookupError`]: tikwatch_profile::LookupError

pub mod format;
mod telegram;

use thiserror::Error;

pub use telegram::{InlineKeyboard, InlineKeyboardButton, Notifier};

/// Errors raised while delivering a message to Telegram.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("network error reaching Telegram")]
    Http(#[from] reqwest::Error),

    #[error("Telegram returned HTTP {status}")]
    Status { status: u16 },

    /// Telegram answered `ok: false`; `description` is its explanation.
    #[error("Telegram rejected the message: {description}")]
    Api { description: String },

    #[error("invalid Telegram API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
