//! AI provider port.
//!
//! Abstracts the external inference service behind a single completion
//! entry point. The provider accepts either a named assistant (persona)
//! or a plain model URI, optionally bound to a provider-held conversation
//! session, and returns raw output text. All normalization (fence
//! stripping, JSON parsing, fallbacks) happens above this port in the
//! gateway.

use async_trait::async_trait;

use crate::domain::foundation::{AssistantRef, ConversationSessionId};

/// What the completion is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTarget {
    /// A provider-side assistant definition (lawyer persona or analyzer).
    Assistant(AssistantRef),
    /// A plain model URI, used for classification prompts.
    Model(String),
}

/// Port for the external AI inference service.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Runs one completion and returns the raw output text.
    ///
    /// When `session` is given, the call is bound to that conversation so
    /// the provider retains prior turns; otherwise it is single-turn.
    ///
    /// # Errors
    ///
    /// Any transport, auth, quota or timeout failure surfaces as a
    /// [`ProviderError`]; the call never blocks past the configured
    /// timeout.
    async fn respond(
        &self,
        target: &PromptTarget,
        session: Option<&ConversationSessionId>,
        input: &str,
    ) -> Result<String, ProviderError>;

    /// Creates a fresh provider-held conversation session.
    async fn create_session(&self) -> Result<ConversationSessionId, ProviderError>;
}

/// AI provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Rate limited or out of quota.
    #[error("rate limited")]
    RateLimited,

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Provider is unavailable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider answered without any output text.
    #[error("provider returned an empty reply")]
    EmptyReply,
}
