//! Chat messaging value types
//!
//! These are the shapes exchanged with the chat transport: inbound events
//! produced by the platform and the pieces of outbound messages (choice
//! buttons, references to previously sent messages).

use serde::{Deserialize, Serialize};

use crate::identifiers::{MessageId, UserId};

/// An event delivered by the chat transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A slash command such as `/start`, stored without the leading slash
    Command { command: String, user_id: UserId },
    /// An inline button was pressed; `data` is the button's callback payload
    ButtonPressed { data: String, user_id: UserId },
    /// A plain text message
    TextReceived { text: String, user_id: UserId },
}

impl InboundEvent {
    pub fn command(command: impl Into<String>, user_id: UserId) -> Self {
        InboundEvent::Command {
            command: command.into(),
            user_id,
        }
    }

    pub fn button(data: impl Into<String>, user_id: UserId) -> Self {
        InboundEvent::ButtonPressed {
            data: data.into(),
            user_id,
        }
    }

    pub fn text(text: impl Into<String>, user_id: UserId) -> Self {
        InboundEvent::TextReceived {
            text: text.into(),
            user_id,
        }
    }

    /// Identity of the user who produced the event
    pub fn user_id(&self) -> UserId {
        match self {
            InboundEvent::Command { user_id, .. }
            | InboundEvent::ButtonPressed { user_id, .. }
            | InboundEvent::TextReceived { user_id, .. } => *user_id,
        }
    }

    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Command { .. } => "command",
            InboundEvent::ButtonPressed { .. } => "button",
            InboundEvent::TextReceived { .. } => "text",
        }
    }
}

/// A single inline choice button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceButton {
    /// Text shown on the button
    pub label: String,
    /// Payload echoed back in `InboundEvent::ButtonPressed`
    pub data: String,
}

impl ChoiceButton {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Inline keyboard attached to an outbound message, laid out in rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceButtons {
    pub rows: Vec<Vec<ChoiceButton>>,
}

impl ChoiceButtons {
    /// Keyboard made of one row
    pub fn row(buttons: Vec<ChoiceButton>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }

    /// Iterates over every button regardless of row
    pub fn buttons(&self) -> impl Iterator<Item = &ChoiceButton> {
        self.rows.iter().flatten()
    }
}

/// Reference to a message previously sent by the bot, used for edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat: UserId,
    pub message_id: MessageId,
}

impl MessageRef {
    pub fn new(chat: UserId, message_id: MessageId) -> Self {
        Self { chat, message_id }
    }
}
