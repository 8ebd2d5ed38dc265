// Caption translation
//
// - context: neighbouring caption text used to steer each request
// - prompt: system/user message composition
// - invoker: one backend call per caption
// - ollama / openai: backend implementations selected through BackendFactory

pub mod context;
pub mod prompt;
pub mod invoker;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;

pub use context::build_context;
pub use invoker::CaptionTranslator;
pub use prompt::TranslationRequest;
use crate::config::{BackendConfig, BackendProvider};
use crate::error::BackendError;

/// A chat-style language model that turns one system + user message pair into text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Send one request and return the model's reply
    async fn complete(&self, system: &str, user: &str) -> Result<String, BackendError>;

    /// Check that the backend is reachable and the configured model can be used
    async fn check_availability(&self) -> Result<(), BackendError>;

    /// Short label for logs, e.g. "ollama/llama3.2:3b"
    fn describe(&self) -> String;
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create the backend named by the configured provider
    pub fn create_backend(config: &BackendConfig) -> Result<Box<dyn TranslationBackend>, BackendError> {
        match config.provider {
            BackendProvider::Ollama => Ok(Box::new(ollama::OllamaBackend::new(config.clone())?)),
            BackendProvider::OpenAi => Ok(Box::new(openai::OpenAiBackend::new(config.clone())?)),
        }
    }
}

/// Trim a raw model reply, rejecting replies with no content
pub(crate) fn clean_reply(raw: &str) -> Result<String, BackendError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BackendError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_factory_selects_provider() {
        let mut config = Config::default().backend;
        assert!(BackendFactory::create_backend(&config).unwrap().describe().starts_with("ollama/"));

        config.provider = BackendProvider::OpenAi;
        config.endpoint = "http://localhost:8080".to_string();
        assert!(BackendFactory::create_backend(&config).unwrap().describe().starts_with("openai/"));
    }

    #[test]
    fn test_clean_reply() {
        assert_eq!(clean_reply("  Bonjour\n").unwrap(), "Bonjour");
        assert!(matches!(clean_reply(" \n\t"), Err(BackendError::EmptyResponse)));
    }
}
