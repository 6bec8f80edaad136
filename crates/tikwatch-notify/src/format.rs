//! User-facing message rendering.
//!
//! All interpolated payload text goes through [`escape_html`] before being
//! sent with `parse_mode: HTML` — a bio containing `<` must not break the
//! message markup.

use tikwatch_monitor::ChangeEvent;
use tikwatch_profile::{LookupError, ProfileRecord};

use crate::{InlineKeyboard, InlineKeyboardButton};

/// Escape the three characters Telegram's HTML parse mode reserves.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Greeting for `/start`.
#[must_use]
pub fn greeting() -> &'static str {
    "Welcome to the TikTok profile bot!\n\nType <b>/info &lt;username&gt;</b> to look up a profile."
}

/// Usage hint for `/info` without an argument.
#[must_use]
pub fn usage() -> &'static str {
    "That is not quite right.\n\nPlease use: <b>/info &lt;username&gt;</b>"
}

/// The lookup result card, rendered as Telegram HTML.
#[must_use]
pub fn profile_card(record: &ProfileRecord) -> String {
    let privacy = if record.is_private { "Private" } else { "Public" };
    let bio = if record.bio.is_empty() {
        "(empty)".to_string()
    } else {
        escape_html(&record.bio)
    };

    format!(
        "👤 <b>Username:</b> <code>{username}</code>\n\
         🏷️ <b>Nickname:</b> <i>{nickname}</i>\n\
         🌍 <b>Region:</b> {region}\n\
         👥 <b>Followers:</b> <b>{followers}</b>\n\
         ➡️ <b>Following:</b> <b>{following}</b>\n\
         📝 <b>Bio:</b> {bio}\n\
         🔒 <b>Account:</b> {privacy}",
        username = escape_html(&record.username),
        nickname = escape_html(&record.nickname),
        region = escape_html(&record.region),
        followers = escape_html(&record.follower_count.to_string()),
        following = escape_html(&record.following_count.to_string()),
    )
}

/// Inline keyboard attached to a profile card: open the profile, or run the
/// same lookup again (the manual retry path).
#[must_use]
pub fn profile_keyboard(record: &ProfileRecord) -> InlineKeyboard {
    InlineKeyboard {
        inline_keyboard: vec![vec![
            InlineKeyboardButton::link("🔗 View on TikTok", record.profile_url()),
            InlineKeyboardButton::callback("🔄 Look up again", format!("lookup:{}", record.username)),
        ]],
    }
}

/// Drift notification for one watched identity.
#[must_use]
pub fn change_alert(event: &ChangeEvent) -> String {
    let mut lines = vec![format!(
        "🔔 <b>Account</b> <code>{}</code> <b>changed!</b>",
        escape_html(&event.username)
    )];

    if let Some(delta) = &event.followers {
        lines.push(format!(
            "👥 Followers: {} ➡️ {}",
            escape_html(&delta.old.to_string()),
            escape_html(&delta.new.to_string())
        ));
    }
    if event.bio_changed {
        lines.push("📝 Bio changed!".to_string());
    }

    lines.join("\n")
}

/// Keyboard attached to a drift notification.
#[must_use]
pub fn change_keyboard(event: &ChangeEvent) -> InlineKeyboard {
    InlineKeyboard {
        inline_keyboard: vec![vec![InlineKeyboardButton::link(
            "🔗 View on TikTok",
            format!("https://www.tiktok.com/@{}", event.username),
        )]],
    }
}

/// Exactly one user-facing sentence per lookup failure kind.
#[must_use]
pub fn lookup_failure(err: &LookupError) -> String {
    match err {
        LookupError::EmptyUsername => {
            "⚠️ Username must not be empty. Example: /info khangdino206".to_string()
        }
        LookupError::InvalidBaseUrl { .. } => {
            "⚠️ The bot is misconfigured. Please tell the operator.".to_string()
        }
        LookupError::Timeout(_) => {
            "⚠️ The lookup service took too long to respond. Please try again.".to_string()
        }
        LookupError::Network(_) => {
            "⚠️ Could not reach the lookup service. Please try again later.".to_string()
        }
        LookupError::UpstreamStatus { status } => format!(
            "⚠️ The lookup service had a problem (error {status}). Please try again later."
        ),
        LookupError::MalformedResponse { .. } => {
            "⚠️ The lookup service returned an unreadable answer.".to_string()
        }
        LookupError::NotFound { message } => format!("⚠️ {}", escape_html(message)),
    }
}
