//! Mock AI provider for testing.
//!
//! Configurable to return scripted replies, inject errors and record every
//! call, allowing tests to run without the real inference service.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockProvider::new()
//!     .with_reply(r#"{"message": "Здравствуйте!"}"#);
//!
//! let text = provider.respond(&target, None, "привет").await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::foundation::ConversationSessionId;
use crate::ports::{AiProvider, PromptTarget, ProviderError};

/// A recorded provider call, for verification.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub target: PromptTarget,
    /// Session the call was bound to, if any.
    pub session: Option<String>,
    pub input: String,
}

/// Mock AI provider.
///
/// Scripted replies are consumed in order; once exhausted, the default
/// reply is returned. Session creation hands out sequentially numbered
/// identifiers unless configured to fail.
#[derive(Debug, Clone)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    default_reply: String,
    fail_respond: bool,
    fail_sessions: bool,
    session_counter: Arc<AtomicU64>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Creates a mock whose default reply is a minimal structured greeting.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            default_reply: r#"{"message": "Здравствуйте! Чем могу помочь?"}"#.to_string(),
            fail_respond: false,
            fail_sessions: false,
            session_counter: Arc::new(AtomicU64::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    /// Queues an error reply.
    pub fn with_error(self, error: ProviderError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// Replaces the default reply used once the script is exhausted.
    pub fn with_default_reply(mut self, content: impl Into<String>) -> Self {
        self.default_reply = content.into();
        self
    }

    /// Makes every completion call fail.
    pub fn failing(mut self) -> Self {
        self.fail_respond = true;
        self
    }

    /// Makes session creation fail.
    pub fn failing_sessions(mut self) -> Self {
        self.fail_sessions = true;
        self
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of sessions handed out.
    pub fn sessions_created(&self) -> u64 {
        self.session_counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    async fn respond(
        &self,
        target: &PromptTarget,
        session: Option<&ConversationSessionId>,
        input: &str,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            target: target.clone(),
            session: session.map(|s| s.as_str().to_string()),
            input: input.to_string(),
        });

        if self.fail_respond {
            return Err(ProviderError::Unavailable("mock is failing".to_string()));
        }

        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => Ok(self.default_reply.clone()),
        }
    }

    async fn create_session(&self) -> Result<ConversationSessionId, ProviderError> {
        if self.fail_sessions {
            return Err(ProviderError::Unavailable(
                "mock session creation disabled".to_string(),
            ));
        }
        let n = self.session_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ConversationSessionId::new(format!("conv-mock-{}", n)))
    }
}
