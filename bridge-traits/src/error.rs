use thiserror::Error;

/// Failures surfaced by host adapter implementations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The host has no implementation of the requested capability.
    #[error("Capability not available on this host: {0}")]
    NotAvailable(String),

    /// The adapter exists but the operation failed.
    #[error("Adapter operation failed: {0}")]
    OperationFailed(String),

    /// A source reference the decode engine cannot even parse.
    #[error("Malformed source reference: {0}")]
    MalformedSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
