//! Outward Notification Sinks
//!
//! Two sinks receive playback updates: a persistent status surface (the
//! always-visible "what is playing" line) and the host's remote transport
//! controls (lock screen, media keys, headset buttons). Both are push-only;
//! failures to publish are logged by the core and never affect playback.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One update for the persistent status surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Surface title line (the service's display name).
    pub title: String,
    /// Current phase, e.g. `"song (loading)"` or `"song (playing)"`.
    pub phase_text: String,
}

/// Transport state mirrored to remote controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    Playing,
    Paused,
    Stopped,
}

/// Track metadata mirrored to remote controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
}

/// Persistent status surface.
#[async_trait::async_trait]
pub trait StatusNotifier: Send + Sync {
    /// Publish or replace the current status line.
    async fn publish(&self, update: StatusUpdate) -> Result<()>;

    /// Dismiss the surface entirely.
    async fn clear(&self) -> Result<()>;
}

/// Remote transport-control surface.
#[async_trait::async_trait]
pub trait TransportControls: Send + Sync {
    /// Register this application as the active transport-control client.
    /// Called once, before the first state update.
    async fn register(&self) -> Result<()>;

    async fn set_playback_state(&self, state: TransportState) -> Result<()>;

    async fn set_metadata(&self, metadata: TrackMetadata) -> Result<()>;
}
