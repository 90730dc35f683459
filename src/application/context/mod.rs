//! Conversation Context Store.
//!
//! Owns the disposable chat → provider-session mapping. Sessions are
//! created on demand through the gateway, cached with a 24-hour expiry,
//! and dropped on close or explicit reset. Losing a mapping only costs
//! conversational memory on the provider side; chat history is untouched.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::gateway::AiGateway;
use crate::domain::foundation::{ChatId, ConversationSessionId};
use crate::ports::SessionCache;

/// Lifetime of a chat → session binding.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// No session could be produced for a chat.
///
/// Callers treat this as "run the turn statelessly", never as a failure of
/// the chat operation itself.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no conversation session available for chat {chat_id}: {reason}")]
pub struct NoSessionAvailable {
    pub chat_id: ChatId,
    pub reason: String,
}

/// Expiring store binding each chat to one provider conversation session.
///
/// Sessions are 1:1 with chats for the lifetime of a mapping: every value
/// comes fresh from the provider for exactly one chat id and is never
/// shared or reused across chats.
pub struct ConversationContextStore {
    cache: Arc<dyn SessionCache>,
    gateway: Arc<AiGateway>,
}

impl ConversationContextStore {
    /// Creates a context store over a cache backend and the gateway's
    /// session-creation primitive.
    pub fn new(cache: Arc<dyn SessionCache>, gateway: Arc<AiGateway>) -> Self {
        Self { cache, gateway }
    }

    /// Returns the live session for a chat, creating and caching a new one
    /// if none exists.
    ///
    /// # Errors
    ///
    /// [`NoSessionAvailable`] when neither lookup nor creation produced a
    /// session; the caller falls back to stateless mode.
    pub async fn get_or_create(
        &self,
        chat_id: ChatId,
    ) -> Result<ConversationSessionId, NoSessionAvailable> {
        match self.cache.get(chat_id).await {
            Ok(Some(session)) => return Ok(session),
            Ok(None) => {}
            Err(err) => {
                // A broken cache is not fatal: a fresh session still works
                // for this turn even if it cannot be remembered.
                warn!(chat_id = %chat_id, error = %err, "session cache lookup failed");
            }
        }

        let session = self
            .gateway
            .create_session()
            .await
            .map_err(|err| NoSessionAvailable {
                chat_id,
                reason: err.to_string(),
            })?;

        if let Err(err) = self.cache.put(chat_id, &session, SESSION_TTL).await {
            warn!(chat_id = %chat_id, error = %err, "failed to cache new session");
        } else {
            info!(chat_id = %chat_id, session = %session, "created conversation session");
        }

        Ok(session)
    }

    /// Removes the mapping for a chat. Idempotent; cache failures are
    /// swallowed after logging since the entry expires on its own.
    pub async fn invalidate(&self, chat_id: ChatId) {
        if let Err(err) = self.cache.remove(chat_id).await {
            warn!(chat_id = %chat_id, error = %err, "failed to invalidate session mapping");
        }
    }

    /// Read-only lookup for diagnostics. No side effects.
    pub async fn peek(&self, chat_id: ChatId) -> Option<ConversationSessionId> {
        match self.cache.get(chat_id).await {
            Ok(session) => session,
            Err(err) => {
                warn!(chat_id = %chat_id, error = %err, "session cache peek failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockProvider;
    use crate::adapters::session_cache::InMemorySessionCache;

    fn store_with(provider: MockProvider) -> (ConversationContextStore, Arc<InMemorySessionCache>) {
        let cache = Arc::new(InMemorySessionCache::new());
        let gateway = Arc::new(AiGateway::new(Arc::new(provider)));
        (
            ConversationContextStore::new(cache.clone(), gateway),
            cache,
        )
    }

    #[tokio::test]
    async fn get_or_create_returns_cached_value() {
        let (store, _) = store_with(MockProvider::new());
        let chat_id = ChatId::new();

        let first = store.get_or_create(chat_id).await.unwrap();
        let second = store.get_or_create(chat_id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn sessions_differ_between_chats() {
        let (store, _) = store_with(MockProvider::new());

        let a = store.get_or_create(ChatId::new()).await.unwrap();
        let b = store.get_or_create(ChatId::new()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn invalidate_forces_a_fresh_session() {
        let (store, _) = store_with(MockProvider::new());
        let chat_id = ChatId::new();

        let first = store.get_or_create(chat_id).await.unwrap();
        store.invalidate(chat_id).await;
        let second = store.get_or_create(chat_id).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let (store, _) = store_with(MockProvider::new());
        let chat_id = ChatId::new();

        store.invalidate(chat_id).await;
        store.invalidate(chat_id).await;
        assert!(store.peek(chat_id).await.is_none());
    }

    #[tokio::test]
    async fn peek_has_no_side_effects() {
        let (store, _) = store_with(MockProvider::new());
        let chat_id = ChatId::new();

        assert!(store.peek(chat_id).await.is_none());
        assert!(store.peek(chat_id).await.is_none());

        let session = store.get_or_create(chat_id).await.unwrap();
        assert_eq!(store.peek(chat_id).await, Some(session));
    }

    #[tokio::test]
    async fn creation_failure_reports_no_session() {
        let (store, _) = store_with(MockProvider::new().failing_sessions());
        let result = store.get_or_create(ChatId::new()).await;
        assert!(result.is_err());
    }
}
