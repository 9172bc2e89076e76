//! Errors which can occur in silent triple generation.

/// Errors that can occur when a triple generator runs.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum GeneratorError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid length: {0}")]
    InvalidLength(String),
    #[error("malformed message: {0}")]
    InvalidMessage(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
}
