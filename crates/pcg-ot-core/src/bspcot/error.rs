//! Errors which can occur in the batched single-point COT protocol.

/// Errors that can occur when the BSP-COT sender runs.
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
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error(transparent)]
    Pprf(#[from] crate::pprf::error::SenderError),
}

/// Errors that can occur when the BSP-COT receiver runs.
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
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("consistency check failed")]
    ConsistencyCheckFailed,
    #[error(transparent)]
    Pprf(#[from] crate::pprf::error::ReceiverError),
}
