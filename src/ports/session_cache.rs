//! Session cache port.
//!
//! Expiring key-value store mapping a chat id to its provider-held
//! conversation session. The mapping is disposable: losing it only costs
//! conversational memory, never chat history.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::{ChatId, ConversationSessionId};

/// Port for the expiring chat → session mapping.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Returns the live session for a chat, if one is cached.
    async fn get(&self, chat_id: ChatId) -> Result<Option<ConversationSessionId>, CacheError>;

    /// Stores the session for a chat with the given time-to-live.
    async fn put(
        &self,
        chat_id: ChatId,
        session: &ConversationSessionId,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Removes the mapping. Idempotent: removing a missing key succeeds.
    async fn remove(&self, chat_id: ChatId) -> Result<(), CacheError>;
}

/// Session cache errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Backend unreachable or misbehaving.
    #[error("session cache unavailable: {0}")]
    Unavailable(String),
}
