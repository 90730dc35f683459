//! Chat messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{truncate_chars, ChatId, MessageId, Timestamp};

/// Upper bound on a lawyer reply persisted from the AI gateway.
pub const MAX_AI_MESSAGE_CHARS: usize = 2000;

/// Characters of the originating problem text quoted into a new chat.
pub const OPENING_PROBLEM_CHARS: usize = 500;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Client,
    Lawyer,
    System,
    Assistant,
}

impl Sender {
    /// Stable string form used in persistence and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::Client => "client",
            Sender::Lawyer => "lawyer",
            Sender::System => "system",
            Sender::Assistant => "assistant",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(Sender::Client),
            "lawyer" => Some(Sender::Lawyer),
            "system" => Some(Sender::System),
            "assistant" => Some(Sender::Assistant),
            _ => None,
        }
    }

    /// True for messages presented as coming from the lawyer side.
    pub fn is_lawyer_side(&self) -> bool {
        matches!(self, Sender::Lawyer | Sender::Assistant)
    }
}

/// A single message in a chat, ordered by its immutable timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    id: MessageId,
    chat_id: ChatId,
    sender: Sender,
    message: String,
    ai_response_data: Option<Value>,
    timestamp: Timestamp,
}

impl ChatMessage {
    /// Creates a client message.
    pub fn client(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self::build(chat_id, Sender::Client, text.into(), None)
    }

    /// Creates a system message.
    pub fn system(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self::build(chat_id, Sender::System, text.into(), None)
    }

    /// Creates a lawyer message from gateway output.
    ///
    /// The text is bounded to [`MAX_AI_MESSAGE_CHARS`]; the structured
    /// payload, when present, is preserved untruncated.
    pub fn lawyer(chat_id: ChatId, text: &str, payload: Option<Value>) -> Self {
        Self::build(
            chat_id,
            Sender::Lawyer,
            truncate_chars(text, MAX_AI_MESSAGE_CHARS),
            payload,
        )
    }

    fn build(chat_id: ChatId, sender: Sender, message: String, payload: Option<Value>) -> Self {
        Self {
            id: MessageId::new(),
            chat_id,
            sender,
            message,
            ai_response_data: payload,
            timestamp: Timestamp::now(),
        }
    }

    /// Reconstitute a message from persistence.
    pub fn reconstitute(
        id: MessageId,
        chat_id: ChatId,
        sender: Sender,
        message: String,
        ai_response_data: Option<Value>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            chat_id,
            sender,
            message,
            ai_response_data,
            timestamp,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn ai_response_data(&self) -> Option<&Value> {
        self.ai_response_data.as_ref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lawyer_message_is_bounded() {
        let chat_id = ChatId::new();
        let long = "ю".repeat(5000);
        let message = ChatMessage::lawyer(chat_id, &long, None);
        assert_eq!(message.message().chars().count(), MAX_AI_MESSAGE_CHARS);
    }

    #[test]
    fn client_message_is_kept_verbatim() {
        let chat_id = ChatId::new();
        let message = ChatMessage::client(chat_id, "Здравствуйте, нужна помощь");
        assert_eq!(message.sender(), Sender::Client);
        assert_eq!(message.message(), "Здравствуйте, нужна помощь");
        assert!(message.ai_response_data().is_none());
    }

    #[test]
    fn lawyer_payload_survives_truncation() {
        let chat_id = ChatId::new();
        let payload = serde_json::json!({"message": "ok", "action_plan": ["шаг 1"]});
        let message = ChatMessage::lawyer(chat_id, "ок", Some(payload.clone()));
        assert_eq!(message.ai_response_data(), Some(&payload));
    }

    #[test]
    fn sender_string_roundtrip() {
        for sender in [Sender::Client, Sender::Lawyer, Sender::System, Sender::Assistant] {
            assert_eq!(Sender::parse(sender.as_str()), Some(sender));
        }
        assert_eq!(Sender::parse("bot"), None);
    }

    #[test]
    fn lawyer_side_covers_lawyer_and_assistant() {
        assert!(Sender::Lawyer.is_lawyer_side());
        assert!(Sender::Assistant.is_lawyer_side());
        assert!(!Sender::Client.is_lawyer_side());
        assert!(!Sender::System.is_lawyer_side());
    }
}
