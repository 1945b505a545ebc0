//! Decode-engine bridge traits and supporting media types.
//!
//! The decode engine is the stateful resource that turns a source reference
//! into audible output. Host applications provide a concrete [`MediaEngine`]
//! (a platform media player, a symphonia pipeline, a test double); the core
//! only drives it through this interface and reacts to the events it emits.
//!
//! A fresh engine instance is opened per load. Preparation is asynchronous:
//! [`MediaEngine::load`] returns quickly and the engine later reports exactly
//! one of [`EngineEvent::Ready`] or [`EngineEvent::Failed`] on its event
//! stream. `start`, `pause`, `seek_to_start` and `set_volume` are only
//! meaningful between `Ready` and `release`; enforcing that window is the
//! core's job, not the engine's.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reference to a playable source. Any scheme is accepted; `http`/`https`
/// references are treated as remote streams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackSource(String);

impl TrackSource {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether playing this source streams over the network.
    pub fn is_remote(&self) -> bool {
        self.0.starts_with("http:") || self.0.starts_with("https:")
    }
}

impl From<String> for TrackSource {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TrackSource {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for TrackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A playable item together with the metadata the catalog knows about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Total duration, when the catalog has it indexed.
    pub duration: Option<Duration>,
    /// Reference handed to the decode engine.
    pub source: TrackSource,
}

impl MediaItem {
    /// Build an item directly from an explicit reference. No catalog lookup
    /// is involved; the reference itself doubles as the display title.
    pub fn from_reference(source: TrackSource) -> Self {
        Self {
            title: Some(source.as_str().to_string()),
            artist: None,
            album: None,
            duration: None,
            source,
        }
    }

    /// Display title, falling back to the source reference.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.source.as_str())
    }
}

/// Asynchronous lifecycle events emitted by a decode engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Preparation finished; `start` is now valid.
    Ready,
    /// The loaded source played to its natural end.
    Finished,
    /// Preparation or playback failed. The engine is unusable afterwards
    /// except for `release`.
    Failed { message: String },
}

/// Stream of [`EngineEvent`]s for one engine instance.
///
/// Returns `None` once the engine has been released and no further events
/// will be delivered.
#[async_trait::async_trait]
pub trait EngineEventStream: Send {
    async fn next(&mut self) -> Option<EngineEvent>;
}

/// One decode-engine instance.
///
/// Implementations must tolerate `release` at any point, including before
/// `load` completes or after a `Failed` event, and must make it idempotent.
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    /// Begin asynchronous preparation of `source`. Fails synchronously only
    /// for references the engine cannot even parse; every other failure is
    /// reported later as [`EngineEvent::Failed`].
    async fn load(&self, source: &TrackSource) -> Result<()>;

    /// Begin or resume producing sound. Valid only after `Ready`.
    async fn start(&self) -> Result<()>;

    /// Pause without discarding position. Valid only after `Ready`.
    async fn pause(&self) -> Result<()>;

    /// Seek back to the beginning of the loaded source.
    async fn seek_to_start(&self) -> Result<()>;

    /// Set output gain, `0.0..=1.0`.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Tear the instance down. Idempotent, always safe.
    async fn release(&self) -> Result<()>;
}

/// Opens fresh engine instances. The returned stream carries the events of
/// that instance only.
pub trait EngineFactory: Send + Sync {
    fn open(&self) -> Result<(Box<dyn MediaEngine>, Box<dyn EngineEventStream>)>;
}
