use thiserror::Error;

/// Failure to turn raw lines into caption entries
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaptionParseError {
    #[error("line {line}: invalid sequence number '{value}'")]
    InvalidSequenceNumber { line: usize, value: String },

    #[error("line {line}: caption {sequence} has no time range line")]
    MissingTimeRange { line: usize, sequence: u32 },
}

/// Failure reported by a translation backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{provider} API error {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    MalformedResponse(String),

    #[error("Empty translation received")]
    EmptyResponse,

    #[error("Model '{0}' is not available on the backend")]
    ModelUnavailable(String),
}

#[derive(Error, Debug)]
pub enum SrtLingoError {
    #[error("Failed to read input directory {path}: {source}")]
    DirectoryRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read subtitle file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: CaptionParseError,
    },

    #[error("Translation of caption {sequence} in {file} failed: {source}")]
    Backend {
        file: String,
        sequence: u32,
        #[source]
        source: BackendError,
    },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[source] BackendError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid subtitle file name: {0}")]
    InvalidFileName(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SrtLingoError>;
