//! Bot API wire types
//!
//! Only the fields the bot reads or writes are modelled; unknown fields in
//! responses are ignored.

use serde::{Deserialize, Serialize};

use core_kernel::{ChoiceButtons, InboundEvent, UserId};

/// Response envelope shared by every method
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub struct EditMessageText<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQuery<'a> {
    pub callback_query_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl From<&ChoiceButtons> for InlineKeyboardMarkup {
    fn from(buttons: &ChoiceButtons) -> Self {
        Self {
            inline_keyboard: buttons
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| InlineKeyboardButton {
                            text: b.label.clone(),
                            callback_data: b.data.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

impl Update {
    /// Converts the update into the event the bot reacts to
    ///
    /// Messages from bots and updates without text or callback data yield
    /// `None`.
    pub fn to_event(&self) -> Option<InboundEvent> {
        if let Some(query) = &self.callback_query {
            let data = query.data.as_deref()?;
            return Some(InboundEvent::button(data, UserId::new(query.from.id)));
        }

        let message = self.message.as_ref()?;
        let from = message.from.as_ref()?;
        if from.is_bot {
            return None;
        }
        let text = message.text.as_deref()?;
        let user = UserId::new(from.id);

        Some(match parse_command(text) {
            Some(command) => InboundEvent::command(command, user),
            None => InboundEvent::text(text, user),
        })
    }

    /// Id of the callback query to acknowledge, if this is a button press
    pub fn callback_query_id(&self) -> Option<&str> {
        self.callback_query.as_ref().map(|q| q.id.as_str())
    }
}

/// Extracts `start` from `/start`, `/start@SomeBot` or `/start payload`
fn parse_command(text: &str) -> Option<&str> {
    let word = text.strip_prefix('/')?.split_whitespace().next().unwrap_or("");
    Some(word.split('@').next().unwrap_or(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ChoiceButton;
    use serde_json::json;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_command_message() {
        let u = update(json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "from": {"id": 42, "is_bot": false, "first_name": "A"},
                "chat": {"id": 42, "type": "private"},
                "text": "/start@ClaimBot extra"
            }
        }));
        assert_eq!(u.to_event(), Some(InboundEvent::command("start", UserId::new(42))));
    }

    #[test]
    fn test_plain_text_message() {
        let u = update(json!({
            "update_id": 2,
            "message": {
                "message_id": 11,
                "from": {"id": 42, "is_bot": false},
                "chat": {"id": 42},
                "text": "player1"
            }
        }));
        assert_eq!(u.to_event(), Some(InboundEvent::text("player1", UserId::new(42))));
    }

    #[test]
    fn test_callback_query() {
        let u = update(json!({
            "update_id": 3,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 42, "is_bot": false},
                "data": "ETH",
                "chat_instance": "x"
            }
        }));
        assert_eq!(u.to_event(), Some(InboundEvent::button("ETH", UserId::new(42))));
        assert_eq!(u.callback_query_id(), Some("cb-1"));
    }

    #[test]
    fn test_ignored_updates() {
        let sticker = update(json!({
            "update_id": 4,
            "message": {"message_id": 1, "from": {"id": 1}, "chat": {"id": 1}}
        }));
        assert_eq!(sticker.to_event(), None);

        let from_bot = update(json!({
            "update_id": 5,
            "message": {"message_id": 1, "from": {"id": 1, "is_bot": true}, "chat": {"id": 1}, "text": "hi"}
        }));
        assert_eq!(from_bot.to_event(), None);

        let edited = update(json!({"update_id": 6, "edited_message": {}}));
        assert_eq!(edited.to_event(), None);
    }

    #[test]
    fn test_keyboard_conversion() {
        let buttons = ChoiceButtons::row(vec![ChoiceButton::new("Solana", "SOL")]);
        let markup = InlineKeyboardMarkup::from(&buttons);
        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({"inline_keyboard": [[{"text": "Solana", "callback_data": "SOL"}]]})
        );
    }

    #[test]
    fn test_error_envelope() {
        let response: ApiResponse<bool> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 5",
            "parameters": {"retry_after": 5}
        }))
        .unwrap();
        assert!(!response.ok);
        assert_eq!(response.error_code, Some(429));
        assert_eq!(response.parameters.and_then(|p| p.retry_after), Some(5));
    }
}
