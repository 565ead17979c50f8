use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Input problems caught before any request is built or sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a YouTube URL")]
    EmptyInput,

    #[error("Please select a valid file type (PDF, Word, PowerPoint, or Text), got {mime_type}")]
    UnsupportedType { mime_type: String },

    #[error("File size must be less than 10MB ({byte_size} bytes given)")]
    TooLarge { byte_size: u64 },

    #[error("Please provide {what} before submitting")]
    MissingInput { what: &'static str },
}

/// Failures of a single dispatch attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("{message}")]
    Server { status: Option<u16>, message: String },

    #[error("Request timed out after {}s", after.as_secs())]
    Timeout { after: Duration },
}

impl DispatchError {
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        DispatchError::Server {
            status,
            message: message.into(),
        }
    }

    /// Whether the user may reasonably try the same submission again.
    pub fn is_retryable(&self) -> bool {
        match self {
            DispatchError::Network { .. } | DispatchError::Timeout { .. } => true,
            DispatchError::Server { status, .. } => status.is_some_and(|s| s >= 500),
        }
    }
}

/// Error payload held by the `Failed` lifecycle state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config file {path}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Invalid API base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ViralscopeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rejected(#[from] crate::state::SubmitRejected),

    #[error("Session is no longer running")]
    SessionClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ViralscopeError>;
