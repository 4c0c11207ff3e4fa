//! Replay error types.

use kishoka_domain::DomainError;
use kishoka_engine::EngineError;
use thiserror::Error;

/// Replay-level errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bar file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bar file is not a JSON bar list
    #[error("Invalid bar file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for replay operations.
pub type SimResult<T> = Result<T, SimError>;
