//! EmergencyRequest aggregate.
//!
//! A request is created from a free-text problem description, analyzed once
//! by an asynchronous job, and never mutated again afterwards. Deletion is an
//! administrative concern outside this module.

use serde_json::Value;

use crate::domain::foundation::{
    truncate_chars, DomainError, ErrorCode, RequestId, Timestamp, ValidationError,
};

use super::status::{RequestStatus, ResponseFormat, Urgency};

/// Minimum length of a problem description, in characters.
pub const MIN_PROBLEM_CHARS: usize = 20;

/// Summary length derived from a plain-text reply.
pub const TEXT_SUMMARY_CHARS: usize = 200;

/// Placeholder summary recorded when the assistant produced nothing usable.
pub const UNRESPONSIVE_SUMMARY: &str = "Ассистент не ответил";

/// Technical metadata captured at submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    /// Client IP address, if known.
    pub ip_address: Option<String>,
    /// Client user agent, if known.
    pub user_agent: Option<String>,
}

/// Emergency legal request aggregate.
///
/// # Invariants
///
/// - `problem_text` is trimmed and at least [`MIN_PROBLEM_CHARS`] characters
/// - `status` only moves forward along the lifecycle graph
/// - `category`/`urgency`/`confidence`/`summary` are populated only on completion
/// - `analyzed_at` is set exactly once, on completion, and is >= `created_at`
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyRequest {
    id: RequestId,
    problem_text: String,
    status: RequestStatus,
    category: Option<String>,
    urgency: Option<Urgency>,
    confidence: f64,
    summary: Option<String>,
    ai_response: Option<Value>,
    response_format: ResponseFormat,
    error_message: Option<String>,
    origin: RequestOrigin,
    created_at: Timestamp,
    analyzed_at: Option<Timestamp>,
}

impl EmergencyRequest {
    /// Creates a new pending request from a raw problem description.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the trimmed text is shorter than
    ///   [`MIN_PROBLEM_CHARS`] characters
    pub fn new(problem_text: &str, origin: RequestOrigin) -> Result<Self, DomainError> {
        let trimmed = problem_text.trim();
        let len = trimmed.chars().count();
        if len < MIN_PROBLEM_CHARS {
            return Err(ValidationError::too_short("problem_text", MIN_PROBLEM_CHARS, len).into());
        }

        Ok(Self {
            id: RequestId::new(),
            problem_text: trimmed.to_string(),
            status: RequestStatus::Pending,
            category: None,
            urgency: None,
            confidence: 0.0,
            summary: None,
            ai_response: None,
            response_format: ResponseFormat::Json,
            error_message: None,
            origin,
            created_at: Timestamp::now(),
            analyzed_at: None,
        })
    }

    /// Reconstitute a request from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: RequestId,
        problem_text: String,
        status: RequestStatus,
        category: Option<String>,
        urgency: Option<Urgency>,
        confidence: f64,
        summary: Option<String>,
        ai_response: Option<Value>,
        response_format: ResponseFormat,
        error_message: Option<String>,
        origin: RequestOrigin,
        created_at: Timestamp,
        analyzed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            problem_text,
            status,
            category,
            urgency,
            confidence,
            summary,
            ai_response,
            response_format,
            error_message,
            origin,
            created_at,
            analyzed_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn problem_text(&self) -> &str {
        &self.problem_text
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn urgency(&self) -> Option<Urgency> {
        self.urgency
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn ai_response(&self) -> Option<&Value> {
        self.ai_response.as_ref()
    }

    pub fn response_format(&self) -> ResponseFormat {
        self.response_format
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn origin(&self) -> &RequestOrigin {
        &self.origin
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn analyzed_at(&self) -> Option<Timestamp> {
        self.analyzed_at
    }

    /// True once analysis finished successfully.
    pub fn is_analyzed(&self) -> bool {
        self.status == RequestStatus::Completed
    }

    /// Wall-clock time the analysis took, if completed.
    pub fn analysis_duration(&self) -> Option<chrono::Duration> {
        self.analyzed_at
            .map(|at| at.duration_since(&self.created_at))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    fn transition_to(&mut self, next: RequestStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "request {} cannot move from {} to {}",
                    self.id,
                    self.status.as_str(),
                    next.as_str()
                ),
            ));
        }
        self.status = next;
        Ok(())
    }

    /// Accepts the request for analysis (pending → analyzing).
    pub fn start_analysis(&mut self) -> Result<(), DomainError> {
        self.transition_to(RequestStatus::Analyzing)
    }

    /// Completes analysis with a structured reply.
    pub fn complete_with_analysis(
        &mut self,
        category: Option<String>,
        urgency: Option<Urgency>,
        confidence: f64,
        summary: Option<String>,
        payload: Value,
    ) -> Result<(), DomainError> {
        self.transition_to(RequestStatus::Completed)?;
        self.category = category;
        self.urgency = urgency;
        self.confidence = confidence;
        self.summary = summary;
        self.ai_response = Some(payload);
        self.response_format = ResponseFormat::Json;
        self.analyzed_at = Some(Timestamp::now());
        Ok(())
    }

    /// Completes analysis with a plain-text reply; the summary is a prefix
    /// of the raw text.
    pub fn complete_with_text(&mut self, raw: String) -> Result<(), DomainError> {
        self.transition_to(RequestStatus::Completed)?;
        self.summary = Some(truncate_chars(&raw, TEXT_SUMMARY_CHARS));
        self.ai_response = Some(Value::String(raw));
        self.response_format = ResponseFormat::Text;
        self.analyzed_at = Some(Timestamp::now());
        Ok(())
    }

    /// Completes analysis when the assistant never produced a usable reply.
    ///
    /// Gateway-level failures are soft: the request still completes, with a
    /// placeholder summary and the failure detail kept in the payload.
    pub fn complete_unresponsive(&mut self, detail: String) -> Result<(), DomainError> {
        self.transition_to(RequestStatus::Completed)?;
        self.summary = Some(UNRESPONSIVE_SUMMARY.to_string());
        self.ai_response = Some(serde_json::json!({ "error": detail }));
        self.response_format = ResponseFormat::Json;
        self.analyzed_at = Some(Timestamp::now());
        Ok(())
    }

    /// Fails the request because the analysis job itself broke.
    pub fn fail(&mut self, error: String) -> Result<(), DomainError> {
        self.transition_to(RequestStatus::Failed)?;
        self.error_message = Some(error);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn accepted() -> EmergencyRequest {
        let mut request =
            EmergencyRequest::new("Попал в ДТП, виновник скрылся", RequestOrigin::default())
                .unwrap();
        request.start_analysis().unwrap();
        request
    }

    #[test]
    fn new_request_trims_and_starts_pending() {
        let request =
            EmergencyRequest::new("  Меня незаконно уволили с работы  ", RequestOrigin::default())
                .unwrap();
        assert_eq!(request.status(), RequestStatus::Pending);
        assert_eq!(request.problem_text(), "Меня незаконно уволили с работы");
        assert!(request.analyzed_at().is_none());
    }

    #[test]
    fn short_text_is_rejected_by_character_count() {
        // 10 characters, under the limit even though the UTF-8 byte count
        // of Cyrillic text is twice that.
        let result = EmergencyRequest::new("Уволили :(", RequestOrigin::default());
        assert!(result.is_err());
    }

    #[test]
    fn twenty_four_char_cyrillic_text_is_accepted() {
        let text = "Попал в ДТП, виновник скрылся";
        assert!(text.chars().count() >= MIN_PROBLEM_CHARS);
        assert!(EmergencyRequest::new(text, RequestOrigin::default()).is_ok());
    }

    #[test]
    fn structured_completion_populates_analysis_fields() {
        let mut request = accepted();
        request
            .complete_with_analysis(
                Some("dtp".to_string()),
                Some(Urgency::High),
                0.9,
                Some("ДТП с скрывшимся виновником".to_string()),
                serde_json::json!({"analysis": {"category": "dtp"}}),
            )
            .unwrap();

        assert_eq!(request.status(), RequestStatus::Completed);
        assert!(request.is_analyzed());
        assert_eq!(request.category(), Some("dtp"));
        assert_eq!(request.urgency(), Some(Urgency::High));
        assert!(request.analyzed_at().unwrap() >= request.created_at());
        assert!(request.analysis_duration().unwrap().num_milliseconds() >= 0);
    }

    #[test]
    fn text_completion_derives_summary_prefix() {
        let mut request = accepted();
        let raw = "а".repeat(500);
        request.complete_with_text(raw).unwrap();

        assert_eq!(request.response_format(), ResponseFormat::Text);
        assert_eq!(request.summary().unwrap().chars().count(), TEXT_SUMMARY_CHARS);
    }

    #[test]
    fn unresponsive_completion_keeps_error_in_payload() {
        let mut request = accepted();
        request.complete_unresponsive("timeout".to_string()).unwrap();

        assert_eq!(request.status(), RequestStatus::Completed);
        assert_eq!(request.summary(), Some(UNRESPONSIVE_SUMMARY));
        assert_eq!(
            request.ai_response().unwrap()["error"],
            serde_json::json!("timeout")
        );
    }

    #[test]
    fn failure_records_the_error() {
        let mut request = accepted();
        request.fail("store unavailable".to_string()).unwrap();
        assert_eq!(request.status(), RequestStatus::Failed);
        assert_eq!(request.error_message(), Some("store unavailable"));
    }

    #[test]
    fn terminal_request_rejects_further_transitions() {
        let mut request = accepted();
        request.complete_with_text("ответ".repeat(10)).unwrap();

        assert!(request.fail("late".to_string()).is_err());
        assert!(request.complete_unresponsive("late".to_string()).is_err());
        assert_eq!(request.status(), RequestStatus::Completed);
    }

    #[test]
    fn pending_request_cannot_complete_directly() {
        let mut request =
            EmergencyRequest::new("Проблема с арендодателем квартиры", RequestOrigin::default())
                .unwrap();
        assert!(request.complete_with_text("ответ".to_string()).is_err());
    }

    proptest! {
        #[test]
        fn texts_under_twenty_chars_never_create_a_request(text in ".{0,19}") {
            prop_assume!(text.trim().chars().count() < MIN_PROBLEM_CHARS);
            prop_assert!(EmergencyRequest::new(&text, RequestOrigin::default()).is_err());
        }

        #[test]
        fn whitespace_padding_does_not_bypass_validation(pad in "[ \t]{0,10}") {
            let text = format!("{}коротко{}", pad, pad);
            prop_assert!(EmergencyRequest::new(&text, RequestOrigin::default()).is_err());
        }
    }
}
