use thiserror::Error;

/// Infrastructure errors raised while assembling the controller's runtime:
/// configuration values that fail validation, bridge capabilities left
/// unset, and logging setup.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
