use tracing::debug;

use crate::config::Config;
use crate::error::BackendError;
use super::{TranslationBackend, TranslationRequest, build_context};

/// Translates single captions through a backend, one call per caption
pub struct CaptionTranslator {
    backend: Box<dyn TranslationBackend>,
    source_language: String,
    target_language: String,
    system_suffix: String,
}

impl CaptionTranslator {
    pub fn new(backend: Box<dyn TranslationBackend>, config: &Config) -> Self {
        Self {
            backend,
            source_language: config.languages.input.clone(),
            target_language: config.languages.output.clone(),
            system_suffix: config.prompt.add_to_system.clone(),
        }
    }

    pub fn backend(&self) -> &dyn TranslationBackend {
        self.backend.as_ref()
    }

    /// Compose the request for caption `index` of a file
    pub fn request_for<'a, S: AsRef<str>>(&'a self, source_texts: &'a [S], index: usize) -> TranslationRequest<'a> {
        TranslationRequest {
            source_language: &self.source_language,
            target_language: &self.target_language,
            system_suffix: &self.system_suffix,
            context: build_context(source_texts, index),
            sentence: source_texts[index].as_ref(),
        }
    }

    /// Translate caption `index`, using its neighbours' original text as context
    pub async fn translate_caption<S: AsRef<str> + Sync>(
        &self,
        source_texts: &[S],
        index: usize,
    ) -> Result<String, BackendError> {
        let request = self.request_for(source_texts, index);
        let system = request.system_message();
        let user = request.user_message();

        debug!("System prompt:\n{}", system);
        debug!("User prompt: {}", user);

        let translation = self.backend.complete(&system, &user).await?;
        debug!("Backend reply: {}", translation);
        Ok(translation)
    }
}
