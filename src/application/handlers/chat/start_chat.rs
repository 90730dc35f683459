//! StartChat command handler.
//!
//! Creates (or returns) the chat binding a request to a lawyer persona.
//! Creation is idempotent over the (request, lawyer) pair. A new chat gets
//! a system announcement, the client's problem text and the persona's
//! opening reply; if any of that fails, the half-built chat is deleted and
//! the failure surfaces to the caller.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::context::ConversationContextStore;
use crate::application::gateway::AiGateway;
use crate::domain::chat::{ChatMessage, LawyerChat, OPENING_PROBLEM_CHARS};
use crate::domain::foundation::{truncate_chars, ChatId, DomainError, RequestId};
use crate::domain::lawyer::{Lawyer, PersonaDirectory};
use crate::ports::{ChatRepository, LawyerRepository, RequestRepository};

use super::render::display_text;

/// Command to find or create a chat.
#[derive(Debug, Clone)]
pub struct StartChatCommand {
    pub request_id: RequestId,
    /// Specialization code of the requested persona.
    pub persona_code: String,
}

/// Errors that can occur when starting a chat.
#[derive(Debug, Clone, Error)]
pub enum StartChatError {
    /// The persona code does not resolve to a known persona.
    #[error("unknown persona code '{0}'")]
    PersonaNotFound(String),

    /// The originating request does not exist.
    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    /// Building the new chat failed; nothing usable was left behind.
    #[error("chat construction failed: {0}")]
    ConstructionFailed(String),

    /// Repository error outside the construction path.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for StartChatError {
    fn from(err: DomainError) -> Self {
        StartChatError::Repository(err.to_string())
    }
}

/// Result of finding or creating a chat.
#[derive(Debug, Clone)]
pub struct StartChatResult {
    pub chat_id: ChatId,
    /// False when an existing chat was returned.
    pub created: bool,
}

/// Handler for StartChat commands.
pub struct StartChatHandler {
    requests: Arc<dyn RequestRepository>,
    chats: Arc<dyn ChatRepository>,
    lawyers: Arc<dyn LawyerRepository>,
    directory: Arc<PersonaDirectory>,
    context: Arc<ConversationContextStore>,
    gateway: Arc<AiGateway>,
}

impl StartChatHandler {
    /// Creates a new handler with the given dependencies.
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        chats: Arc<dyn ChatRepository>,
        lawyers: Arc<dyn LawyerRepository>,
        directory: Arc<PersonaDirectory>,
        context: Arc<ConversationContextStore>,
        gateway: Arc<AiGateway>,
    ) -> Self {
        Self {
            requests,
            chats,
            lawyers,
            directory,
            context,
            gateway,
        }
    }

    /// Finds or creates the chat for a (request, persona) pair.
    pub async fn handle(&self, cmd: StartChatCommand) -> Result<StartChatResult, StartChatError> {
        let persona = self
            .directory
            .resolve(&cmd.persona_code)
            .ok_or_else(|| StartChatError::PersonaNotFound(cmd.persona_code.clone()))?;

        let request = self
            .requests
            .find_by_id(cmd.request_id)
            .await?
            .ok_or(StartChatError::RequestNotFound(cmd.request_id))?;

        // Lazy upsert of the lawyer record, keyed by display name.
        let lawyer = match self.lawyers.find_by_name(&persona.name).await? {
            Some(lawyer) => lawyer,
            None => {
                let lawyer = Lawyer::from_persona(persona);
                self.lawyers.create(&lawyer).await?;
                lawyer
            }
        };

        // Idempotency: one chat per (request, lawyer) pair.
        if let Some(existing) = self
            .chats
            .find_by_request_and_lawyer(request.id(), lawyer.id())
            .await?
        {
            return Ok(StartChatResult {
                chat_id: existing.id(),
                created: false,
            });
        }

        let chat = LawyerChat::new(
            request.id(),
            lawyer.id(),
            lawyer.name(),
            request.problem_text(),
        );
        self.chats.create(&chat).await?;

        if let Err(reason) = self.build_opening(&chat, &lawyer, request.problem_text()).await {
            // Full rollback: no partial chat without a greeting survives.
            if let Err(err) = self.chats.delete(chat.id()).await {
                warn!(chat_id = %chat.id(), error = %err, "rollback of failed chat construction failed");
            }
            self.context.invalidate(chat.id()).await;
            return Err(StartChatError::ConstructionFailed(reason));
        }

        info!(chat_id = %chat.id(), lawyer = lawyer.name(), "chat created");
        Ok(StartChatResult {
            chat_id: chat.id(),
            created: true,
        })
    }

    /// Appends the announcement, the client's problem and the persona's
    /// opening reply to a freshly created chat.
    async fn build_opening(
        &self,
        chat: &LawyerChat,
        lawyer: &Lawyer,
        problem_text: &str,
    ) -> Result<(), String> {
        let announcement = format!(
            "К чату подключился юрист {} ({})",
            lawyer.name(),
            lawyer.specialization().display_name()
        );
        self.chats
            .append_message(&ChatMessage::system(chat.id(), announcement))
            .await
            .map_err(|e| e.to_string())?;

        let opening_problem = truncate_chars(problem_text, OPENING_PROBLEM_CHARS);
        self.chats
            .append_message(&ChatMessage::client(chat.id(), opening_problem.clone()))
            .await
            .map_err(|e| e.to_string())?;

        // Bind a fresh conversation session; creation failure degrades the
        // opening turn to stateless mode.
        let session = self.context.get_or_create(chat.id()).await.ok();

        let reply = self
            .gateway
            .chat_turn(
                lawyer.assistant_id(),
                session.as_ref(),
                lawyer.name(),
                &opening_problem,
            )
            .await
            .map_err(|e| e.to_string())?;

        let (text, payload) = display_text(&reply);
        self.chats
            .append_message(&ChatMessage::lawyer(chat.id(), &text, payload))
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }
}
