//! AI Gateway: normalizes external inference calls.
//!
//! The rest of the system consumes gateway results without knowing the wire
//! format: replies arrive either as parsed JSON or as plain text, markdown
//! code fences are stripped, and a session-bound chat turn that fails is
//! retried once statelessly before an error surfaces.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use crate::domain::foundation::{truncate_chars, AssistantRef, ConversationSessionId};
use crate::domain::request::{Urgency, TEXT_SUMMARY_CHARS};
use crate::ports::{AiProvider, PromptTarget, ProviderError};

/// Hard gateway failure: the provider call itself did not produce a reply.
///
/// Soft failures (unparseable or error-shaped payloads) never surface here;
/// they are folded into [`AnalysisReply`]/[`TurnReply`] variants instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("AI provider call failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Structured fields extracted from an analysis reply.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredAnalysis {
    pub category: Option<String>,
    pub urgency: Option<Urgency>,
    pub confidence: f64,
    pub summary: Option<String>,
    /// Full parsed payload, kept for persistence.
    pub payload: Value,
}

/// Normalized result of an analysis call.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisReply {
    /// Reply parsed as JSON.
    Structured(StructuredAnalysis),
    /// Reply kept as plain text with a best-effort summary.
    Text { raw: String, summary: String },
}

/// Normalized payload of a chat turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnReply {
    /// Reply parsed as a JSON object; persona-shaped replies are
    /// guaranteed a `"message"` string.
    Structured(Map<String, Value>),
    /// Reply kept as plain text.
    Text(String),
}

/// Identity fields that mark a reply as persona-shaped. Advisory fields
/// (questions, action plan) are not listed: replies carrying only those are
/// rendered as sections by the chat flow instead of getting a greeting.
const PERSONA_FIELDS: [&str; 3] = ["lawyer_name", "specialization", "next_contact"];

/// Stateless façade over the AI provider.
pub struct AiGateway {
    provider: Arc<dyn AiProvider>,
}

impl AiGateway {
    /// Creates a gateway over the given provider.
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Analyzes a problem description with the named assistant.
    ///
    /// The reply is fence-stripped and parsed as JSON when possible;
    /// otherwise it is returned as text with a summary of the first
    /// 200 characters.
    ///
    /// # Errors
    ///
    /// [`GatewayError`] only when the provider call itself failed; callers
    /// recover from this, it is never fatal to the process.
    pub async fn analyze(
        &self,
        assistant: &AssistantRef,
        text: &str,
    ) -> Result<AnalysisReply, GatewayError> {
        let target = PromptTarget::Assistant(assistant.clone());
        let raw = self.provider.respond(&target, None, text).await?;
        let stripped = strip_code_fence(raw.trim());

        match serde_json::from_str::<Value>(stripped) {
            Ok(payload @ Value::Object(_)) => {
                Ok(AnalysisReply::Structured(extract_analysis(payload)))
            }
            _ => Ok(AnalysisReply::Text {
                summary: truncate_chars(stripped, TEXT_SUMMARY_CHARS),
                raw: stripped.to_string(),
            }),
        }
    }

    /// Runs one chat turn with a lawyer persona.
    ///
    /// When `session` is given the call is bound to it so the provider
    /// retains prior turns; a failure of a bound call degrades to exactly
    /// one stateless retry before surfacing the error.
    pub async fn chat_turn(
        &self,
        assistant: &AssistantRef,
        session: Option<&ConversationSessionId>,
        persona_name: &str,
        last_user_message: &str,
    ) -> Result<TurnReply, GatewayError> {
        let target = PromptTarget::Assistant(assistant.clone());

        let raw = match self
            .provider
            .respond(&target, session, last_user_message)
            .await
        {
            Ok(raw) => raw,
            Err(err) if session.is_some() => {
                warn!(error = %err, "session-bound chat turn failed, retrying statelessly");
                self.provider.respond(&target, None, last_user_message).await?
            }
            Err(err) => return Err(err.into()),
        };

        Ok(normalize_turn(raw.trim(), persona_name))
    }

    /// Creates a fresh provider-held conversation session.
    pub async fn create_session(&self) -> Result<ConversationSessionId, GatewayError> {
        Ok(self.provider.create_session().await?)
    }

    /// Runs a raw single-turn prompt, returning trimmed output text.
    ///
    /// Used by the classifier, which does its own interpretation.
    pub async fn single_turn(
        &self,
        target: &PromptTarget,
        input: &str,
    ) -> Result<String, GatewayError> {
        let raw = self.provider.respond(target, None, input).await?;
        Ok(raw.trim().to_string())
    }
}

/// Strips a markdown code fence (```json ... ``` or ``` ... ```) if present.
fn strip_code_fence(text: &str) -> &str {
    let mut stripped = text;
    if let Some(rest) = stripped.strip_prefix("```json") {
        stripped = rest;
    } else if let Some(rest) = stripped.strip_prefix("```") {
        stripped = rest;
    }
    if let Some(rest) = stripped.strip_suffix("```") {
        stripped = rest;
    }
    stripped.trim()
}

/// Pulls the well-known analysis fields out of a parsed payload.
///
/// Fields live under an `"analysis"` object when the assistant follows its
/// instructions, but top-level keys are accepted too.
fn extract_analysis(payload: Value) -> StructuredAnalysis {
    let (category, urgency, confidence, summary) = {
        let fields = payload
            .get("analysis")
            .and_then(Value::as_object)
            .or_else(|| payload.as_object());

        let get_str = |key: &str| {
            fields
                .and_then(|f| f.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        (
            get_str("category"),
            get_str("urgency").as_deref().and_then(Urgency::parse),
            fields
                .and_then(|f| f.get("confidence"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            get_str("summary"),
        )
    };

    StructuredAnalysis {
        category,
        urgency,
        confidence,
        summary,
        payload,
    }
}

/// Normalizes a chat-turn reply.
///
/// A structured reply without a `"message"` string but with persona-style
/// fields gets a synthesized greeting so the chat UI always has displayable
/// text, even when the external reply is malformed.
fn normalize_turn(raw: &str, persona_name: &str) -> TurnReply {
    let stripped = strip_code_fence(raw);

    match serde_json::from_str::<Value>(stripped) {
        Ok(Value::Object(mut map)) => {
            let has_message = map.get("message").and_then(Value::as_str).is_some();
            if !has_message {
                let persona_shaped = PERSONA_FIELDS.iter().any(|f| map.contains_key(*f));
                if persona_shaped {
                    map.insert(
                        "message".to_string(),
                        Value::String(format!(
                            "Здравствуйте! С вами {}. Расскажите подробнее о вашей ситуации.",
                            persona_name
                        )),
                    );
                }
            }
            TurnReply::Structured(map)
        }
        _ => TurnReply::Text(stripped.to_string()),
    }
}
