//! HTTP DTOs for chat endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::chat::DebugSnapshot;
use crate::domain::chat::ChatMessage;

/// Body of a chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageBody {
    /// Message text.
    #[serde(default)]
    pub message: String,
}

/// Response carrying the lawyer's reply.
#[derive(Debug, Clone, Serialize)]
pub struct LawyerReplyResponse {
    pub success: bool,
    pub message: String,
    pub sender: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_data: Option<serde_json::Value>,
}

impl LawyerReplyResponse {
    /// Builds the success payload for a lawyer reply.
    pub fn new(message: String, ai_data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message,
            sender: "lawyer",
            ai_data,
        }
    }
}

/// Response to starting (or resuming) a chat.
#[derive(Debug, Clone, Serialize)]
pub struct StartChatResponse {
    pub success: bool,
    pub chat_id: String,
    pub created: bool,
    pub redirect_url: String,
}

impl StartChatResponse {
    /// Builds the payload for a started chat.
    pub fn new(chat_id: impl std::fmt::Display, created: bool) -> Self {
        Self {
            success: true,
            chat_id: chat_id.to_string(),
            created,
            redirect_url: format!("/chat/{}/", chat_id),
        }
    }
}

/// View of one transcript message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub sender: &'static str,
    pub message: String,
    pub timestamp: String,
}

impl From<&ChatMessage> for MessageView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            sender: message.sender().as_str(),
            message: message.message().to_string(),
            timestamp: message.timestamp().to_string(),
        }
    }
}

/// Transcript response.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<MessageView>,
}

/// Simple acknowledgement: `{success, message}`.
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

impl AckResponse {
    /// Builds an acknowledgement.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Debug info payload.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfoResponse {
    pub success: bool,
    pub debug_info: DebugInfo,
}

/// Diagnostic view of a chat's conversation binding.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub message_count: i32,
    pub recent_messages: Vec<DebugMessageView>,
}

/// Shortened view of one recent message.
#[derive(Debug, Clone, Serialize)]
pub struct DebugMessageView {
    pub sender: &'static str,
    pub preview: String,
}

impl From<DebugSnapshot> for DebugInfoResponse {
    fn from(snapshot: DebugSnapshot) -> Self {
        Self {
            success: true,
            debug_info: DebugInfo {
                conversation_id: snapshot.session,
                message_count: snapshot.message_count,
                recent_messages: snapshot
                    .recent
                    .into_iter()
                    .map(|m| DebugMessageView {
                        sender: m.sender.as_str(),
                        preview: m.preview,
                    })
                    .collect(),
            },
        }
    }
}
