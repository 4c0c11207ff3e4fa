//! Engine error types.
//!
//! Only configuration and registry lookups fail hard. Everything that can go
//! wrong during an evaluation degrades to a [`SkipReason`](crate::SkipReason)
//! or an [`EngineWarning`](crate::EngineWarning).

use kishoka_domain::DomainError;
use thiserror::Error;

/// Errors that can occur while building or looking up engine components.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Configuration failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Strategy identifier not present in the registry
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
