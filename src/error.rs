//! Error types for chunked summarization

use thiserror::Error;

/// Errors raised anywhere in the summarization pipeline.
///
/// Nothing in the pipeline retries or downgrades these; every variant
/// terminates the run.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Tokenizer unavailable for model {model}: {reason}")]
    Tokenizer { model: String, reason: String },

    #[error("Content exceeds maximum: {tokens} tokens, {limit} tokens allowed for {model}")]
    ContentExceedsMaximum {
        model: String,
        tokens: usize,
        limit: usize,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SummaryError {
    /// True for errors detected before any chunking or network activity.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SummaryError::UnknownModel(_) | SummaryError::Configuration(_) | SummaryError::Input(_)
        )
    }
}

impl From<config::ConfigError> for SummaryError {
    fn from(err: config::ConfigError) -> Self {
        SummaryError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SummaryError>;
