//! HTTP DTOs for request endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::request::RequestSnapshot;

/// Body of a problem submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequestBody {
    /// Free-text problem description.
    #[serde(default)]
    pub problem_text: String,
}

/// Response to an accepted submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequestResponse {
    pub success: bool,
    pub request_id: String,
    pub message: String,
    pub redirect_url: String,
}

impl SubmitRequestResponse {
    /// Builds the success payload for a created request.
    pub fn created(request_id: impl std::fmt::Display) -> Self {
        Self {
            success: true,
            request_id: request_id.to_string(),
            message: "Запрос успешно создан!".to_string(),
            redirect_url: format!("/request/{}/", request_id),
        }
    }
}

/// Analysis status view.
#[derive(Debug, Clone, Serialize)]
pub struct RequestStatusView {
    pub status: &'static str,
    pub has_response: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<RequestSnapshot> for RequestStatusView {
    fn from(snapshot: RequestSnapshot) -> Self {
        Self {
            status: snapshot.status.as_str(),
            has_response: snapshot.has_response,
            category: snapshot.category,
            urgency: snapshot.urgency.map(|u| u.as_str()),
            response: snapshot.response,
            summary: snapshot.summary,
            error_message: snapshot.error_message,
        }
    }
}

/// Failure payload: `{success: false, error}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    /// Builds a failure payload.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Plain not-found payload: `{error}`.
#[derive(Debug, Clone, Serialize)]
pub struct NotFoundBody {
    pub error: String,
}

impl NotFoundBody {
    /// Builds a not-found payload.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
