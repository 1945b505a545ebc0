//! # Playback Error Types
//!
//! Error taxonomy for the playback controller. Three families matter at
//! runtime: load failures (the source could not be prepared), an empty
//! catalog on a random pick, and usage errors (an engine operation issued
//! outside its valid window). Usage errors abort the offending transition
//! but never take the controller down.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The source reference could not be loaded into a decode engine.
    #[error("Failed to load '{src}': {message}")]
    Load { src: String, message: String },

    /// A random pick found the catalog empty.
    #[error("No available items to play")]
    NoItemsAvailable,

    /// An engine operation was issued outside its valid window, e.g. start
    /// before the engine reported ready.
    #[error("Invalid engine operation: {operation} {condition}")]
    Usage {
        operation: &'static str,
        condition: &'static str,
    },

    /// A bridge adapter failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The controller task is gone; no further commands can be delivered.
    #[error("Playback controller is no longer running")]
    ControllerClosed,
}

impl PlaybackError {
    /// Returns `true` if this is a programming fault rather than a runtime
    /// condition.
    pub fn is_usage(&self) -> bool {
        matches!(self, PlaybackError::Usage { .. })
    }

    /// Returns `true` if the controller recovers from this error on its own
    /// by settling in the stopped state.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlaybackError::Load { .. } | PlaybackError::NoItemsAvailable
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
