use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::error::BackendError;
use super::{TranslationBackend, clean_reply};

/// Chat message object shared by request and response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatOptions {
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
}

/// Backend for a local ollama server (`/api/chat`)
pub struct OllamaBackend {
    client: Client,
    config: BackendConfig,
}

impl OllamaBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    pub fn build_request(&self, system: &str, user: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::new("system", system), ChatMessage::new("user", user)],
            stream: false,
            options: self.config.temperature.map(|temperature| ChatOptions { temperature }),
        }
    }

    /// Pull the assistant reply out of a raw `/api/chat` response body
    pub fn extract_reply(body: &str) -> Result<String, BackendError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        if !response.done {
            debug!("ollama reported an unfinished response");
        }

        clean_reply(&response.message.content)
    }
}

#[async_trait]
impl TranslationBackend for OllamaBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let url = self.url("/api/chat");
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&self.build_request(system, user))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                provider: "ollama",
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        debug!("Raw ollama response: {}", body);

        Self::extract_reply(&body)
    }

    async fn check_availability(&self) -> Result<(), BackendError> {
        let response = self.client
            .post(self.url("/api/show"))
            .json(&json!({ "name": self.config.model }))
            .send()
            .await?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.config.model);
            Ok(())
        } else {
            Err(BackendError::ModelUnavailable(format!(
                "{} (pull it first: ollama pull {})",
                self.config.model, self.config.model
            )))
        }
    }

    fn describe(&self) -> String {
        format!("ollama/{}", self.config.model)
    }
}
