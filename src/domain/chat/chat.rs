//! LawyerChat aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{truncate_chars, ChatId, LawyerId, RequestId, Timestamp};

/// Characters of the problem text used in an auto-generated title.
pub const TITLE_PROBLEM_CHARS: usize = 50;

/// Chat lifecycle status.
///
/// Chats are created active. A client can close a chat; completed and
/// archived are administrative states. Closing or archiving stamps
/// `archived_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Active,
    Pending,
    Completed,
    Archived,
    Closed,
}

impl ChatStatus {
    /// Stable string form used in persistence and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::Active => "active",
            ChatStatus::Pending => "pending",
            ChatStatus::Completed => "completed",
            ChatStatus::Archived => "archived",
            ChatStatus::Closed => "closed",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ChatStatus::Active),
            "pending" => Some(ChatStatus::Pending),
            "completed" => Some(ChatStatus::Completed),
            "archived" => Some(ChatStatus::Archived),
            "closed" => Some(ChatStatus::Closed),
            _ => None,
        }
    }

    /// True when new client messages are accepted.
    pub fn is_writable(&self) -> bool {
        matches!(self, ChatStatus::Active | ChatStatus::Pending)
    }
}

/// Chat between a client and one lawyer persona, born from one request.
///
/// # Invariants
///
/// - at most one chat exists per (request, lawyer) pair (enforced by the
///   creation flow and a unique constraint in the store)
/// - `message_count`/`last_message_at` mirror the associated messages and
///   are updated in the same transaction as each append
#[derive(Debug, Clone, PartialEq)]
pub struct LawyerChat {
    id: ChatId,
    request_id: RequestId,
    lawyer_id: LawyerId,
    status: ChatStatus,
    title: String,
    message_count: i32,
    last_message_at: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
    archived_at: Option<Timestamp>,
}

impl LawyerChat {
    /// Creates a new active chat with an auto-generated title.
    pub fn new(
        request_id: RequestId,
        lawyer_id: LawyerId,
        lawyer_name: &str,
        problem_text: &str,
    ) -> Self {
        let now = Timestamp::now();
        let title = format!(
            "Консультация с {} по вопросу: {}...",
            lawyer_name,
            truncate_chars(problem_text, TITLE_PROBLEM_CHARS)
        );
        Self {
            id: ChatId::new(),
            request_id,
            lawyer_id,
            status: ChatStatus::Active,
            title,
            message_count: 0,
            last_message_at: None,
            created_at: now,
            updated_at: now,
            archived_at: None,
        }
    }

    /// Reconstitute a chat from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ChatId,
        request_id: RequestId,
        lawyer_id: LawyerId,
        status: ChatStatus,
        title: String,
        message_count: i32,
        last_message_at: Option<Timestamp>,
        created_at: Timestamp,
        updated_at: Timestamp,
        archived_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            request_id,
            lawyer_id,
            status,
            title,
            message_count,
            last_message_at,
            created_at,
            updated_at,
            archived_at,
        }
    }

    pub fn id(&self) -> ChatId {
        self.id
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn lawyer_id(&self) -> LawyerId {
        self.lawyer_id
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message_count(&self) -> i32 {
        self.message_count
    }

    pub fn last_message_at(&self) -> Option<Timestamp> {
        self.last_message_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn archived_at(&self) -> Option<Timestamp> {
        self.archived_at
    }

    /// True when new client messages are accepted.
    pub fn is_writable(&self) -> bool {
        self.status.is_writable()
    }

    /// Closes the chat. Idempotent: closing a closed chat changes nothing.
    pub fn close(&mut self) {
        if self.status == ChatStatus::Closed {
            return;
        }
        self.status = ChatStatus::Closed;
        if self.archived_at.is_none() {
            self.archived_at = Some(Timestamp::now());
        }
        self.updated_at = Timestamp::now();
    }

    /// Archives the chat (administrative).
    pub fn archive(&mut self) {
        if self.status == ChatStatus::Archived {
            return;
        }
        self.status = ChatStatus::Archived;
        if self.archived_at.is_none() {
            self.archived_at = Some(Timestamp::now());
        }
        self.updated_at = Timestamp::now();
    }

    /// Mirrors a message append on the in-memory aggregate.
    ///
    /// The store applies the same update transactionally with the insert.
    pub fn record_message(&mut self, at: Timestamp) {
        self.message_count += 1;
        self.last_message_at = Some(at);
        self.updated_at = Timestamp::now();
    }
}
