//! Chat repository port (chats plus their messages).
//!
//! Messages are owned by their chat: deleting a chat removes its messages,
//! and appending a message updates the chat's derived counters in the same
//! transactional unit.

use async_trait::async_trait;

use crate::domain::chat::{ChatMessage, LawyerChat};
use crate::domain::foundation::{ChatId, DomainError, LawyerId, RequestId};

/// Repository port for [`LawyerChat`] aggregates and their messages.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Persists a new chat.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create(&self, chat: &LawyerChat) -> Result<(), DomainError>;

    /// Updates chat state (status, archived_at, title).
    ///
    /// # Errors
    ///
    /// - `ChatNotFound` if the chat does not exist
    async fn update(&self, chat: &LawyerChat) -> Result<(), DomainError>;

    /// Finds a chat by id. Returns `None` if not found.
    async fn find_by_id(&self, id: ChatId) -> Result<Option<LawyerChat>, DomainError>;

    /// Finds the chat for a (request, lawyer) pair, if one exists.
    ///
    /// At most one such chat exists; creation is idempotent over this key.
    async fn find_by_request_and_lawyer(
        &self,
        request_id: RequestId,
        lawyer_id: LawyerId,
    ) -> Result<Option<LawyerChat>, DomainError>;

    /// Appends a message and updates the parent chat's `message_count` and
    /// `last_message_at` in one transactional unit.
    ///
    /// # Errors
    ///
    /// - `ChatNotFound` if the chat does not exist
    /// - `DatabaseError` on persistence failure
    async fn append_message(&self, message: &ChatMessage) -> Result<(), DomainError>;

    /// All messages of a chat in ascending timestamp order.
    async fn messages(&self, chat_id: ChatId) -> Result<Vec<ChatMessage>, DomainError>;

    /// The most recent `limit` messages, still in ascending order.
    async fn recent_messages(
        &self,
        chat_id: ChatId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, DomainError>;

    /// Deletes a chat and, by cascade, its messages.
    ///
    /// Used to roll back a chat whose construction failed midway.
    async fn delete(&self, id: ChatId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ChatRepository) {}
    }
}
