//! Inbound Telegram update types and command dispatch.
//!
//! Only the fields this bot reads are modeled; everything else in an update
//! is ignored. Commands the bot does not know are ignored silently — group
//! chats are full of other bots' traffic.

use serde::Deserialize;

use tikwatch_core::canonicalize_username;
use tikwatch_notify::{format, NotifyError};

use crate::api::AppState;

/// A Telegram update as delivered to the webhook. Exactly one of the inner
/// options is normally set.
#[derive(Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// An inline-keyboard button press. `message` carries the chat the button
/// lives in, which is where the answer goes.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

/// The commands this bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Info { username: String },
    InfoMissingArg,
    Ignore,
}

/// Parse a message text into a [`Command`].
///
/// `/info@botname` style addressing is accepted; the username argument is
/// canonicalized the same way the watch-list is (whitespace and `@` stripped).
#[must_use]
pub fn parse_command(text: &str) -> Command {
    let mut parts = text.split_whitespace();
    let command = parts.next().unwrap_or("");
    let command = command.split('@').next().unwrap_or(command);

    match command {
        "/start" => Command::Start,
        "/info" => match parts.next() {
            Some(arg) => {
                let username = canonicalize_username(arg);
                if username.is_empty() {
                    Command::InfoMissingArg
                } else {
                    Command::Info { username }
                }
            }
            None => Command::InfoMissingArg,
        },
        _ => Command::Ignore,
    }
}

/// Process one update end to end: parse, act, reply.
///
/// # Errors
///
/// Returns [`NotifyError`] when the reply cannot be delivered; lookup
/// failures are not errors here — they become their per-kind reply sentence.
pub async fn handle_update(state: &AppState, update: Update) -> Result<(), NotifyError> {
    if let Some(message) = update.message {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        match parse_command(text) {
            Command::Start => {
                state
                    .notifier
                    .send_message(message.chat.id, format::greeting(), None)
                    .await
            }
            Command::InfoMissingArg => {
                state
                    .notifier
                    .send_message(message.chat.id, format::usage(), None)
                    .await
            }
            Command::Info { username } => lookup_and_reply(state, message.chat.id, &username).await,
            Command::Ignore => Ok(()),
        }
    } else if let Some(callback) = update.callback_query {
        let Some(chat_id) = callback.message.map(|m| m.chat.id) else {
            return Ok(());
        };
        let Some(username) = callback
            .data
            .as_deref()
            .and_then(|d| d.strip_prefix("lookup:"))
        else {
            return Ok(());
        };
        lookup_and_reply(state, chat_id, username).await
    } else {
        Ok(())
    }
}

/// Resolve and answer with exactly one terminal message: the profile card on
/// success, the per-kind failure sentence otherwise.
async fn lookup_and_reply(
    state: &AppState,
    chat_id: i64,
    username: &str,
) -> Result<(), NotifyError> {
    match state.profile.lookup(username).await {
        Ok(record) => state.notifier.deliver_profile(chat_id, &record).await,
        Err(err) => {
            tracing::info!(username, error = %err, "interactive lookup failed");
            state
                .notifier
                .send_message(chat_id, &format::lookup_failure(&err), None)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_start() {
        assert_eq!(parse_command("/start"), Command::Start);
        assert_eq!(parse_command("/start@tikwatch_bot"), Command::Start);
    }

    #[test]
    fn parse_info_with_argument() {
        assert_eq!(
            parse_command("/info khangdino206"),
            Command::Info {
                username: "khangdino206".to_string()
            }
        );
    }

    #[test]
    fn parse_info_strips_at_prefix_from_handle() {
        assert_eq!(
            parse_command("/info @khangdino206"),
            Command::Info {
                username: "khangdino206".to_string()
            }
        );
    }

    #[test]
    fn parse_info_without_argument_asks_for_usage() {
        assert_eq!(parse_command("/info"), Command::InfoMissingArg);
        assert_eq!(parse_command("/info   "), Command::InfoMissingArg);
        assert_eq!(parse_command("/info @"), Command::InfoMissingArg);
    }

    #[test]
    fn parse_unknown_text_is_ignored() {
        assert_eq!(parse_command("hello there"), Command::Ignore);
        assert_eq!(parse_command("/weather"), Command::Ignore);
        assert_eq!(parse_command(""), Command::Ignore);
    }

    #[test]
    fn update_deserializes_message_form() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 1, "message": {"chat": {"id": 42}, "text": "/info x"}}"#,
        )
        .expect("update should parse");
        assert_eq!(update.message.unwrap().chat.id, 42);
    }

    #[test]
    fn update_deserializes_callback_form() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 2, "callback_query": {"data": "lookup:x",
                "message": {"chat": {"id": 7}}}}"#,
        )
        .expect("update should parse");
        let callback = update.callback_query.unwrap();
        assert_eq!(callback.data.as_deref(), Some("lookup:x"));
        assert_eq!(callback.message.unwrap().chat.id, 7);
    }
}
