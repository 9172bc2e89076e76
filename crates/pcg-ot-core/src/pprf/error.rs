//! Errors which can occur in the puncturable PRF protocol.

/// Errors that can occur when the puncturable PRF sender runs.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid length: {0}")]
    InvalidLength(String),
    #[error("malformed message: {0}")]
    InvalidMessage(String),
}

/// Errors that can occur when the puncturable PRF receiver runs.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid length: {0}")]
    InvalidLength(String),
    #[error("malformed message: {0}")]
    InvalidMessage(String),
}
