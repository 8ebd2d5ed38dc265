// Backend for servers speaking the OpenAI chat completions API
// (OpenAI itself, llama.cpp server, LM Studio, vLLM, ...)

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::error::BackendError;
use super::{TranslationBackend, clean_reply};
use super::ollama::ChatMessage;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

pub struct OpenAiBackend {
    client: Client,
    config: BackendConfig,
    api_key: Option<String>,
}

impl OpenAiBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = Some(config.api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty()));

        Ok(Self { client, config, api_key })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    pub fn build_request(&self, system: &str, user: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::new("system", system), ChatMessage::new("user", user)],
            temperature: self.config.temperature,
        }
    }

    /// Pull the first choice's content out of a raw completions response body
    pub fn extract_reply(body: &str) -> Result<String, BackendError> {
        let response: CompletionResponse = serde_json::from_str(body)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::MalformedResponse("response contains no choices".to_string()))?;

        clean_reply(&choice.message.content)
    }
}

#[async_trait]
impl TranslationBackend for OpenAiBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let url = self.url("/v1/chat/completions");
        debug!("Sending translation request to: {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .json(&self.build_request(system, user))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                provider: "openai",
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        debug!("Raw completion response: {}", body);

        Self::extract_reply(&body)
    }

    async fn check_availability(&self) -> Result<(), BackendError> {
        let response = self
            .authorize(self.client.get(self.url("/v1/models")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                provider: "openai",
                status: status.as_u16(),
                message: error_text,
            });
        }

        let models: ModelList = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        if models.data.iter().any(|model| model.id == self.config.model) {
            info!("Model '{}' is available", self.config.model);
            Ok(())
        } else {
            Err(BackendError::ModelUnavailable(self.config.model.clone()))
        }
    }

    fn describe(&self) -> String {
        format!("openai/{}", self.config.model)
    }
}
