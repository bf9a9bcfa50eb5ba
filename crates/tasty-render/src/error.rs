//! Error types for style rendering.
//!
//! [`StyleError`] covers everything the render crate can fail on: strict
//! parsing, cache key serialization, configuration loading and errors raised
//! by handlers themselves.

use thiserror::Error;

/// Errors that can occur when configuring the engine or rendering styles.
#[derive(Debug, Error)]
pub enum StyleError {
    /// Malformed style value rejected by strict parsing.
    #[error(transparent)]
    Parse(#[from] tasty_parser::ParseError),

    /// Style map could not be serialized into a cache key.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration document is not valid YAML for [`EngineConfig`](crate::EngineConfig).
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A handler refused its input.
    #[error("handler '{handler}' failed: {message}")]
    Handler { handler: String, message: String },
}

impl StyleError {
    /// Builds a [`StyleError::Handler`].
    pub fn handler(handler: impl Into<String>, message: impl Into<String>) -> Self {
        StyleError::Handler {
            handler: handler.into(),
            message: message.into(),
        }
    }
}

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, StyleError>;
