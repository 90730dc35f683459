//! SendMessage command handler.
//!
//! Appends the client's message, runs one chat turn against the persona's
//! assistant (session-bound when a conversation session is available) and
//! persists the lawyer's reply. All failures come back as error results;
//! the chat itself stays usable and a retry is simply another message.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::application::context::ConversationContextStore;
use crate::application::gateway::AiGateway;
use crate::domain::chat::{ChatMessage, Sender};
use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::{ChatRepository, LawyerRepository};

use super::render::display_text;

/// Messages of recent history considered for a turn.
pub const HISTORY_WINDOW: usize = 10;

/// Input used when the window contains no client message.
const DEFAULT_USER_MESSAGE: &str = "Здравствуйте, нужна ваша помощь.";

/// Command to send a client message to a chat.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub chat_id: ChatId,
    pub text: String,
}

/// Errors that can occur when sending a message.
#[derive(Debug, Clone, Error)]
pub enum SendMessageError {
    /// Message is empty or whitespace only.
    #[error("message text cannot be empty")]
    EmptyMessage,

    /// No chat with this id.
    #[error("chat {0} not found")]
    ChatNotFound(ChatId),

    /// The chat is closed or archived.
    #[error("chat {0} no longer accepts messages")]
    ChatClosed(ChatId),

    /// The lawyer record behind the chat is missing.
    #[error("lawyer record for chat {0} not found")]
    LawyerNotFound(ChatId),

    /// The AI call failed even after the stateless fallback.
    #[error("lawyer did not respond: {0}")]
    Gateway(String),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for SendMessageError {
    fn from(err: DomainError) -> Self {
        SendMessageError::Repository(err.to_string())
    }
}

/// The lawyer's reply to a sent message.
#[derive(Debug, Clone)]
pub struct LawyerReply {
    /// Display text, bounded as persisted.
    pub message: String,
    /// Structured payload when the reply was JSON.
    pub payload: Option<Value>,
}

/// Role of a history entry sent toward the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRole {
    User,
    Assistant,
}

/// One entry of the recent-history window.
#[derive(Debug, Clone)]
pub struct HistoryMessage {
    pub role: HistoryRole,
    pub content: String,
}

/// Maps stored messages to the provider-facing window: client messages
/// become user turns, lawyer messages become assistant turns, and
/// system/assistant-origin messages are excluded.
pub fn history_window(messages: &[ChatMessage]) -> Vec<HistoryMessage> {
    messages
        .iter()
        .filter_map(|m| {
            let role = match m.sender() {
                Sender::Client => HistoryRole::User,
                Sender::Lawyer => HistoryRole::Assistant,
                Sender::System | Sender::Assistant => return None,
            };
            Some(HistoryMessage {
                role,
                content: m.message().to_string(),
            })
        })
        .collect()
}

/// The most recent user entry of a window, or the default greeting.
fn last_user_message(window: &[HistoryMessage]) -> String {
    window
        .iter()
        .rev()
        .find(|m| m.role == HistoryRole::User)
        .map(|m| m.content.clone())
        .unwrap_or_else(|| DEFAULT_USER_MESSAGE.to_string())
}

/// Handler for SendMessage commands.
pub struct SendMessageHandler {
    chats: Arc<dyn ChatRepository>,
    lawyers: Arc<dyn LawyerRepository>,
    context: Arc<ConversationContextStore>,
    gateway: Arc<AiGateway>,
}

impl SendMessageHandler {
    /// Creates a new handler with the given dependencies.
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        lawyers: Arc<dyn LawyerRepository>,
        context: Arc<ConversationContextStore>,
        gateway: Arc<AiGateway>,
    ) -> Self {
        Self {
            chats,
            lawyers,
            context,
            gateway,
        }
    }

    /// Handles one client message and returns the lawyer's reply.
    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<LawyerReply, SendMessageError> {
        let text = cmd.text.trim();
        if text.is_empty() {
            return Err(SendMessageError::EmptyMessage);
        }

        let chat = self
            .chats
            .find_by_id(cmd.chat_id)
            .await?
            .ok_or(SendMessageError::ChatNotFound(cmd.chat_id))?;
        if !chat.is_writable() {
            return Err(SendMessageError::ChatClosed(cmd.chat_id));
        }

        let lawyer = self
            .lawyers
            .find_by_id(chat.lawyer_id())
            .await?
            .ok_or(SendMessageError::LawyerNotFound(cmd.chat_id))?;

        self.chats
            .append_message(&ChatMessage::client(chat.id(), text))
            .await?;

        let recent = self.chats.recent_messages(chat.id(), HISTORY_WINDOW).await?;
        let window = history_window(&recent);
        let user_input = last_user_message(&window);

        // Whatever session value is read here governs this turn; a
        // concurrent reset is accepted best-effort (no extra locking).
        let session = match self.context.get_or_create(chat.id()).await {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(chat_id = %chat.id(), error = %err, "no session, falling back to stateless turn");
                None
            }
        };

        let reply = self
            .gateway
            .chat_turn(
                lawyer.assistant_id(),
                session.as_ref(),
                lawyer.name(),
                &user_input,
            )
            .await
            .map_err(|e| SendMessageError::Gateway(e.to_string()))?;

        let (display, payload) = display_text(&reply);
        let lawyer_message = ChatMessage::lawyer(chat.id(), &display, payload.clone());
        self.chats.append_message(&lawyer_message).await?;

        Ok(LawyerReply {
            message: lawyer_message.message().to_string(),
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockProvider;
    use crate::adapters::memory::{InMemoryChatRepository, InMemoryLawyerRepository};
    use crate::adapters::session_cache::InMemorySessionCache;
    use crate::domain::chat::LawyerChat;
    use crate::domain::foundation::RequestId;
    use crate::domain::lawyer::{Lawyer, PersonaDirectory, Specialization};
    use crate::ports::ProviderError;

    struct Fixture {
        handler: SendMessageHandler,
        chats: Arc<InMemoryChatRepository>,
        provider: MockProvider,
        context: Arc<ConversationContextStore>,
        chat_id: ChatId,
    }

    async fn fixture(provider: MockProvider) -> Fixture {
        let chats = Arc::new(InMemoryChatRepository::new());
        let lawyers = Arc::new(InMemoryLawyerRepository::new());
        let gateway = Arc::new(AiGateway::new(Arc::new(provider.clone())));
        let context = Arc::new(ConversationContextStore::new(
            Arc::new(InMemorySessionCache::new()),
            gateway.clone(),
        ));

        let directory = PersonaDirectory::builtin();
        let lawyer = Lawyer::from_persona(directory.get(Specialization::Labor).unwrap());
        lawyers.create(&lawyer).await.unwrap();

        let chat = LawyerChat::new(
            RequestId::new(),
            lawyer.id(),
            lawyer.name(),
            "Мне угрожают увольнением без выплаты зарплаты",
        );
        chats.create(&chat).await.unwrap();

        Fixture {
            handler: SendMessageHandler::new(
                chats.clone(),
                lawyers,
                context.clone(),
                gateway,
            ),
            chats,
            provider,
            context,
            chat_id: chat.id(),
        }
    }

    fn command(chat_id: ChatId, text: &str) -> SendMessageCommand {
        SendMessageCommand {
            chat_id,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn reply_is_persisted_and_counters_updated() {
        let fixture = fixture(MockProvider::new().with_reply(
            r#"{"message": "Расскажите, когда вам последний раз платили?"}"#,
        ))
        .await;

        let reply = fixture
            .handler
            .handle(command(fixture.chat_id, "Зарплату не платят третий месяц"))
            .await
            .unwrap();

        assert!(reply.message.contains("платили"));
        assert!(reply.payload.is_some());

        let chat = fixture.chats.find_by_id(fixture.chat_id).await.unwrap().unwrap();
        assert_eq!(chat.message_count(), 2);

        let messages = fixture.chats.messages(fixture.chat_id).await.unwrap();
        assert_eq!(messages[0].sender(), Sender::Client);
        assert_eq!(messages[1].sender(), Sender::Lawyer);
        assert_eq!(chat.last_message_at(), Some(messages[1].timestamp()));
    }

    #[tokio::test]
    async fn empty_message_is_rejected_without_side_effects() {
        let fixture = fixture(MockProvider::new()).await;

        let result = fixture.handler.handle(command(fixture.chat_id, "   ")).await;
        assert!(matches!(result, Err(SendMessageError::EmptyMessage)));

        let chat = fixture.chats.find_by_id(fixture.chat_id).await.unwrap().unwrap();
        assert_eq!(chat.message_count(), 0);
        assert!(fixture.chats.messages(fixture.chat_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_chat_is_rejected() {
        let fixture = fixture(MockProvider::new()).await;
        let result = fixture.handler.handle(command(ChatId::new(), "привет")).await;
        assert!(matches!(result, Err(SendMessageError::ChatNotFound(_))));
    }

    #[tokio::test]
    async fn closed_chat_rejects_messages() {
        let fixture = fixture(MockProvider::new()).await;
        let mut chat = fixture.chats.find_by_id(fixture.chat_id).await.unwrap().unwrap();
        chat.close();
        fixture.chats.update(&chat).await.unwrap();

        let result = fixture.handler.handle(command(fixture.chat_id, "привет")).await;
        assert!(matches!(result, Err(SendMessageError::ChatClosed(_))));
    }

    #[tokio::test]
    async fn turn_is_bound_to_the_chat_session() {
        let fixture = fixture(MockProvider::new()).await;

        fixture
            .handler
            .handle(command(fixture.chat_id, "Первое сообщение о проблеме"))
            .await
            .unwrap();

        let calls = fixture.provider.calls();
        let last = calls.last().unwrap();
        assert!(last.session.is_some());
        assert_eq!(last.input, "Первое сообщение о проблеме");
    }

    #[tokio::test]
    async fn turn_after_reset_is_stateless_then_rebinds() {
        let fixture = fixture(MockProvider::new()).await;

        fixture
            .handler
            .handle(command(fixture.chat_id, "Первое сообщение"))
            .await
            .unwrap();
        let first_session = fixture
            .provider
            .calls()
            .last()
            .unwrap()
            .session
            .clone()
            .unwrap();

        fixture.context.invalidate(fixture.chat_id).await;

        fixture
            .handler
            .handle(command(fixture.chat_id, "Второе сообщение"))
            .await
            .unwrap();
        let second_session = fixture
            .provider
            .calls()
            .last()
            .unwrap()
            .session
            .clone()
            .unwrap();

        // A fresh session was bound: the provider has no memory of the
        // prior turns even though the transcript still shows them.
        assert_ne!(first_session, second_session);
    }

    #[tokio::test]
    async fn session_failure_degrades_to_stateless_turn() {
        let fixture = fixture(MockProvider::new().failing_sessions()).await;

        fixture
            .handler
            .handle(command(fixture.chat_id, "Вопрос по зарплате"))
            .await
            .unwrap();

        assert!(fixture.provider.calls().last().unwrap().session.is_none());
    }

    #[tokio::test]
    async fn gateway_failure_keeps_chat_usable() {
        let fixture = fixture(
            MockProvider::new()
                .with_error(ProviderError::Network("reset".to_string()))
                .with_error(ProviderError::Network("reset".to_string())),
        )
        .await;

        let result = fixture
            .handler
            .handle(command(fixture.chat_id, "Сообщение без ответа"))
            .await;
        assert!(matches!(result, Err(SendMessageError::Gateway(_))));

        // The client message was appended; the chat accepts a retry.
        let chat = fixture.chats.find_by_id(fixture.chat_id).await.unwrap().unwrap();
        assert_eq!(chat.message_count(), 1);
        assert!(chat.is_writable());

        let retry = fixture
            .handler
            .handle(command(fixture.chat_id, "Повторная попытка"))
            .await;
        assert!(retry.is_ok());
    }

    #[tokio::test]
    async fn long_reply_is_truncated_before_persistence() {
        let long_reply = format!(r#"{{"message": "{}"}}"#, "ю".repeat(3000));
        let fixture = fixture(MockProvider::new().with_reply(long_reply)).await;

        let reply = fixture
            .handler
            .handle(command(fixture.chat_id, "Расскажите подробно"))
            .await
            .unwrap();

        assert_eq!(reply.message.chars().count(), 2000);
    }

    #[test]
    fn history_window_maps_roles_and_drops_system() {
        let chat_id = ChatId::new();
        let messages = vec![
            ChatMessage::system(chat_id, "юрист подключился"),
            ChatMessage::client(chat_id, "вопрос"),
            ChatMessage::lawyer(chat_id, "ответ", None),
        ];

        let window = history_window(&messages);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].role, HistoryRole::User);
        assert_eq!(window[1].role, HistoryRole::Assistant);
    }

    #[test]
    fn last_user_message_defaults_to_greeting() {
        assert_eq!(last_user_message(&[]), DEFAULT_USER_MESSAGE);
    }
}
