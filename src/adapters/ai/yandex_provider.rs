//! Yandex Cloud provider - AiProvider implementation over the
//! OpenAI-compatible Responses API.
//!
//! Completions go to `POST /responses`, addressed either to a stored
//! assistant (`prompt: {id}`) or a plain model URI, optionally bound to a
//! conversation created via `POST /conversations`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = YandexConfig::new(api_key, folder_id)
//!     .with_base_url("https://ai.api.cloud.yandex.net/v1")
//!     .with_timeout(Duration::from_secs(60));
//!
//! let provider = YandexProvider::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::domain::foundation::ConversationSessionId;
use crate::ports::{AiProvider, PromptTarget, ProviderError};

/// Configuration for the Yandex Cloud provider.
#[derive(Debug, Clone)]
pub struct YandexConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Cloud folder (project) identifier.
    pub folder_id: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl YandexConfig {
    /// Creates a new configuration with the given API key and folder.
    pub fn new(api_key: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            folder_id: folder_id.into(),
            base_url: "https://ai.api.cloud.yandex.net/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Yandex Cloud provider implementation.
pub struct YandexProvider {
    config: YandexConfig,
    client: Client,
}

/// Request body for `POST /responses`.
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<PromptRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation: Option<&'a str>,
    input: &'a str,
}

#[derive(Debug, Serialize)]
struct PromptRef<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConversationCreated {
    id: String,
}

impl YandexProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: YandexConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.config.base_url)
    }

    fn conversations_url(&self) -> String {
        format!("{}/conversations", self.config.base_url)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if e.is_connect() {
            ProviderError::Network(format!("Connection failed: {}", e))
        } else {
            ProviderError::Network(e.to_string())
        }
    }

    /// Converts an unsuccessful API response status into an error.
    async fn handle_response_status(&self, response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(ProviderError::AuthenticationFailed),
            429 => Err(ProviderError::RateLimited),
            400 => Err(ProviderError::InvalidRequest(error_body)),
            500..=599 => Err(ProviderError::Unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(ProviderError::Network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }
}

#[async_trait]
impl AiProvider for YandexProvider {
    async fn respond(
        &self,
        target: &PromptTarget,
        session: Option<&ConversationSessionId>,
        input: &str,
    ) -> Result<String, ProviderError> {
        let (model, prompt) = match target {
            PromptTarget::Model(uri) => (Some(uri.as_str()), None),
            PromptTarget::Assistant(assistant) => {
                (None, Some(PromptRef { id: assistant.as_str() }))
            }
        };

        let body = ResponsesRequest {
            model,
            prompt,
            conversation: session.map(ConversationSessionId::as_str),
            input,
        };

        let response = self
            .client
            .post(self.responses_url())
            .bearer_auth(self.config.api_key())
            .header("OpenAI-Project", &self.config.folder_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = self.handle_response_status(response).await?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(format!("Malformed response body: {}", e)))?;

        match extract_output_text(&payload) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ProviderError::EmptyReply),
        }
    }

    async fn create_session(&self) -> Result<ConversationSessionId, ProviderError> {
        let response = self
            .client
            .post(self.conversations_url())
            .bearer_auth(self.config.api_key())
            .header("OpenAI-Project", &self.config.folder_id)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = self.handle_response_status(response).await?;

        let created: ConversationCreated = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(format!("Malformed conversation body: {}", e)))?;

        Ok(ConversationSessionId::new(created.id))
    }
}

/// Pulls the output text out of a Responses API payload.
///
/// Accepts both the flattened `output_text` convenience field and the full
/// `output[].content[].text` shape.
fn extract_output_text(payload: &Value) -> Option<String> {
    if let Some(text) = payload.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let items = payload.get("output")?.as_array()?;
    let mut collected = String::new();
    for item in items {
        let Some(contents) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for content in contents {
            if content.get("type").and_then(Value::as_str) == Some("output_text") {
                if let Some(text) = content.get("text").and_then(Value::as_str) {
                    collected.push_str(text);
                }
            }
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected)
    }
}
