//! Error types for chatblocks.
//!
//! Library crates use [`ChatBlocksError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all chatblocks operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatBlocksError {
    /// Request body rejected before reaching the parser.
    #[error("{message}")]
    InvalidInput { message: String },

    /// Trimmed input is longer than the parser accepts.
    #[error("Input text exceeds maximum allowed length (100,000 characters)")]
    InputTooLarge { len: usize, max: usize },

    /// Every parse strategy came back empty.
    #[error("Could not parse conversation. Use format: 'User: ... Assistant: ...'")]
    NoPairsFound,

    /// The language-model endpoint could not be reached or answered with a failure.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The language-model endpoint answered, but not with a usable label list.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON encoding or decoding error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ChatBlocksError>;

impl ChatBlocksError {
    /// Create an invalid-input error from any displayable message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP-style status the request boundary reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } | Self::NoPairsFound => 400,
            Self::InputTooLarge { .. } => 413,
            Self::UpstreamUnavailable(_) | Self::MalformedResponse(_) => 502,
            Self::Config { .. } | Self::Io { .. } | Self::Serialization(_) => 500,
        }
    }

    /// Whether the caller sent something it should fix (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<serde_json::Error> for ChatBlocksError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
