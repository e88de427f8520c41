use std::path::PathBuf;

use crate::config::Key;

/// Failure to assemble a complete `PluginConfig`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required field `{key}`")]
    Missing { key: Key },

    #[error("invalid value {value:?} for `{key}`: {reason}")]
    Invalid {
        key: Key,
        value: String,
        reason: String,
    },

    #[error("malformed plugin parameters: {0}")]
    Params(String),

    #[error("failed to load defaults file '{}': {message}", path.display())]
    File { path: PathBuf, message: String },
}

/// Failure to deliver the message to the webhook
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Top-level error for one plugin invocation
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Helper type for Results that use PluginError
pub type Result<T> = std::result::Result<T, PluginError>;
