use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, SrtLingoError};

// Default values for optional sections
fn default_timeout_secs() -> u64 {
    300
}

fn default_concurrency() -> usize {
    1
}

fn default_show_progress() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub directories: DirectoriesConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub languages: LanguagesConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoriesConfig {
    /// Directory scanned (non-recursively) for `.srt` files
    pub input: PathBuf,
    /// Directory translated files are written to
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Appended verbatim to the system instruction
    #[serde(default)]
    pub add_to_system: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Literal substring removed from output file names
    #[serde(default)]
    pub replace_string: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesConfig {
    /// Source language name as it should appear in the prompt (e.g. "English")
    pub input: String,
    /// Target language name as it should appear in the prompt (e.g. "German")
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendProvider {
    /// Local ollama server using the chat API
    Ollama,
    /// Any server speaking the OpenAI chat completions API
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub provider: BackendProvider,
    /// Base URL of the backend, without the API path
    pub endpoint: String,
    /// Model used for translation
    pub model: String,
    /// API key for OpenAI-compatible servers; OPENAI_API_KEY is used when empty
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling temperature, backend default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of captions translated at once; 1 keeps strict sequential order
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Draw a progress bar per file
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            show_progress: default_show_progress(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directories: DirectoriesConfig {
                input: PathBuf::from("input"),
                output: PathBuf::from("output"),
            },
            prompt: PromptConfig::default(),
            output: OutputConfig {
                replace_string: ".en".to_string(),
            },
            languages: LanguagesConfig {
                input: "English".to_string(),
                output: "German".to_string(),
            },
            backend: BackendConfig {
                provider: BackendProvider::Ollama,
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3.2:3b".to_string(),
                api_key: String::new(),
                timeout_secs: default_timeout_secs(),
                temperature: Some(0.3),
            },
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SrtLingoError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SrtLingoError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SrtLingoError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SrtLingoError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.directories.input.as_os_str().is_empty() {
            return Err(SrtLingoError::Config("directories.input must not be empty".to_string()));
        }
        if self.directories.output.as_os_str().is_empty() {
            return Err(SrtLingoError::Config("directories.output must not be empty".to_string()));
        }
        if self.languages.input.trim().is_empty() || self.languages.output.trim().is_empty() {
            return Err(SrtLingoError::Config(
                "languages.input and languages.output must both be set".to_string(),
            ));
        }
        if self.backend.endpoint.trim().is_empty() {
            return Err(SrtLingoError::Config("backend.endpoint must not be empty".to_string()));
        }
        if self.backend.model.trim().is_empty() {
            return Err(SrtLingoError::Config("backend.model must not be empty".to_string()));
        }
        if self.backend.timeout_secs == 0 {
            return Err(SrtLingoError::Config("backend.timeout_secs must be at least 1".to_string()));
        }
        if self.pipeline.concurrency == 0 {
            return Err(SrtLingoError::Config("pipeline.concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}
