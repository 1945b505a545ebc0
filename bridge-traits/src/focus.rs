//! Audio Focus Abstraction
//!
//! Audio focus is the shared permission to produce audible output, arbitrated
//! by a service external to this process. Hosts with a real arbiter implement
//! [`AudioFocusService`] over it; hosts without one inject an implementation
//! that reports focus as permanently granted (see `bridge-desktop`).

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Outcome of a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusResponse {
    /// Focus was obtained synchronously.
    Granted,
    /// The arbiter will answer later through the change stream.
    Pending,
    /// The arbiter refused the request.
    Denied,
}

/// Focus changes pushed by the arbiter, independent of any request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusChange {
    /// Focus was (re)gained; full-volume playback is allowed.
    Gained,
    /// Focus was taken by another application. When `can_duck` is true the
    /// holder permits continued playback at reduced volume; otherwise sound
    /// must stop.
    Lost { can_duck: bool },
}

/// Stream of [`FocusChange`] notifications.
///
/// Returns `None` when the arbiter connection is closed.
#[async_trait::async_trait]
pub trait FocusChangeStream: Send {
    async fn next(&mut self) -> Option<FocusChange>;
}

/// Interface to the platform audio-focus arbiter.
#[async_trait::async_trait]
pub trait AudioFocusService: Send + Sync {
    /// Ask for exclusive playback focus.
    async fn request_focus(&self) -> Result<FocusResponse>;

    /// Give focus back. Returns `true` if a held grant was actually
    /// released; releasing when nothing is held is not an error.
    async fn abandon_focus(&self) -> Result<bool>;

    /// Subscribe to focus changes pushed by the arbiter.
    async fn subscribe_changes(&self) -> Result<Box<dyn FocusChangeStream>>;
}
