//! Thin Telegram Bot API client: `sendMessage` and `sendPhoto` with HTML
//! parse mode and optional inline keyboards.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::NotifyError;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// One button of an inline keyboard. Exactly one of `url` / `callback_data`
/// is set per button.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl InlineKeyboardButton {
    #[must_use]
    pub fn link(text: &str, url: String) -> Self {
        Self {
            text: text.to_string(),
            url: Some(url),
            callback_data: None,
        }
    }

    #[must_use]
    pub fn callback(text: &str, data: String) -> Self {
        Self {
            text: text.to_string(),
            url: None,
            callback_data: Some(data),
        }
    }
}

/// Rows of buttons attached below a message.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// Subset of the Telegram response envelope we care about.
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboard>,
}

#[derive(Serialize)]
struct SendPhotoBody<'a> {
    chat_id: i64,
    photo: &'a str,
    caption: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboard>,
}

/// Sender for the Telegram Bot API.
///
/// Holds one shared `reqwest::Client`, the bot token, and the API base URL.
/// Use [`Notifier::new`] for production or [`Notifier::with_base_url`] to
/// point at a mock server in tests.
pub struct Notifier {
    client: Client,
    token: String,
    base_url: Url,
}

impl Notifier {
    /// Creates a notifier pointed at the production Telegram API.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        Self::with_base_url(token, timeout_secs, TELEGRAM_API_BASE)
    }

    /// Creates a notifier with a custom API base URL (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NotifyError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| NotifyError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            token: token.to_string(),
            base_url,
        })
    }

    /// Sends an HTML-formatted text message.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] on transport failure, a non-2xx status, or a
    /// Telegram-level rejection.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), NotifyError> {
        self.call(
            "sendMessage",
            chat_id,
            &SendMessageBody {
                chat_id,
                text,
                parse_mode: "HTML",
                reply_markup: keyboard,
            },
        )
        .await
    }

    /// Sends a photo by URL with an HTML-formatted caption.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] on transport failure, a non-2xx status, or a
    /// Telegram-level rejection.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), NotifyError> {
        self.call(
            "sendPhoto",
            chat_id,
            &SendPhotoBody {
                chat_id,
                photo: photo_url,
                caption,
                parse_mode: "HTML",
                reply_markup: keyboard,
            },
        )
        .await
    }

    async fn call<B: Serialize>(
        &self,
        api_method: &str,
        chat_id: i64,
        body: &B,
    ) -> Result<(), NotifyError> {
        let url = self.method_url(api_method);
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            // Telegram puts the error description in the body even on non-2xx;
            // prefer it when present.
            if let Ok(parsed) = response.json::<TelegramResponse>().await {
                if let Some(description) = parsed.description {
                    return Err(NotifyError::Api { description });
                }
            }
            return Err(NotifyError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: TelegramResponse = response.json().await?;
        if !parsed.ok {
            return Err(NotifyError::Api {
                description: parsed
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        tracing::debug!(api_method, chat_id, "telegram message delivered");
        Ok(())
    }

    /// Deliver a lookup result: photo with caption when an avatar is
    /// sendable, plain message otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when Telegram refuses the message.
    pub async fn deliver_profile(
        &self,
        chat_id: i64,
        record: &tikwatch_profile::ProfileRecord,
    ) -> Result<(), NotifyError> {
        let card = crate::format::profile_card(record);
        let keyboard = crate::format::profile_keyboard(record);
        match &record.avatar_url {
            Some(avatar) => {
                self.send_photo(chat_id, avatar, &card, Some(&keyboard))
                    .await
            }
            None => self.send_message(chat_id, &card, Some(&keyboard)).await,
        }
    }

    /// Deliver a drift notification for one watched identity.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when Telegram refuses the message.
    pub async fn deliver_event(
        &self,
        chat_id: i64,
        event: &tikwatch_monitor::ChangeEvent,
    ) -> Result<(), NotifyError> {
        let alert = crate::format::change_alert(event);
        let keyboard = crate::format::change_keyboard(event);
        self.send_message(chat_id, &alert, Some(&keyboard)).await
    }

    /// `<base>/bot<token>/<method>` — the Bot API path shape.
    fn method_url(&self, api_method: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/bot{}/{}", self.token, api_method));
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_embeds_token_and_method() {
        let notifier =
            Notifier::with_base_url("123:abc", 10, "https://api.telegram.org").expect("notifier");
        let url = notifier.method_url("sendMessage");
        assert_eq!(url.as_str(), "https://api.telegram.org/bot123:abc/sendMessage");
    }

    #[test]
    fn keyboard_serializes_without_null_fields() {
        let kb = InlineKeyboard {
            inline_keyboard: vec![vec![
                InlineKeyboardButton::link("View", "https://example.com".to_string()),
                InlineKeyboardButton::callback("Again", "lookup:someone".to_string()),
            ]],
        };
        let json = serde_json::to_value(&kb).expect("serialize");
        let first = &json["inline_keyboard"][0][0];
        assert_eq!(first["url"], "https://example.com");
        assert!(first.get("callback_data").is_none());
        let second = &json["inline_keyboard"][0][1];
        assert_eq!(second["callback_data"], "lookup:someone");
        assert!(second.get("url").is_none());
    }
}
