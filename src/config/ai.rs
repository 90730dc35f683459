//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration (Yandex Cloud, OpenAI-compatible surface)
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the cloud project
    pub api_key: String,

    /// Cloud folder (project) identifier
    pub folder_id: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for classification prompts (assistants carry their own models)
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full model URI for plain-model completions
    pub fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.folder_id, self.model)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("AI_API_KEY"));
        }
        if self.folder_id.is_empty() {
            return Err(ValidationError::MissingRequired("AI_FOLDER_ID"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidProviderUrl);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            folder_id: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://ai.api.cloud.yandex.net/v1".to_string()
}

fn default_model() -> String {
    "yandexgpt".to_string()
}

fn default_timeout() -> u64 {
    60
}
