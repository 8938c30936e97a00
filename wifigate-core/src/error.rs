//! Core error types for `wifigate`.

use thiserror::Error;

/// Core error type for `wifigate` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two bridges share the same name.
    #[error("Duplicate bridge name: {0}")]
    DuplicateBridge(String),

    /// Invalid data from an API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error while reading or writing configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
