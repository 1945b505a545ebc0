//! Controller state types.

use bridge_traits::{MediaItem, TrackSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Top-level playback phase. Exactly one value is active at a time.
///
/// `Preparing` and `Playing` imply a live decode session; `Stopped` and
/// `Retrieving` imply none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// The item catalog is still indexing; commands are deferred.
    Retrieving,
    Stopped,
    /// A decode session is loading and has not reported ready yet.
    Preparing,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Retrieving => "retrieving",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Preparing => "preparing",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Audio-focus standing, as last reported by the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFocus {
    /// No focus and the holder does not tolerate other sound: playback must
    /// be silent regardless of [`PlaybackState`].
    NoFocusNoDuck,
    /// No focus but quiet playback is tolerated.
    NoFocusCanDuck,
    Focused,
}

impl fmt::Display for AudioFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AudioFocus::NoFocusNoDuck => "no-focus",
            AudioFocus::NoFocusCanDuck => "no-focus-can-duck",
            AudioFocus::Focused => "focused",
        };
        f.write_str(name)
    }
}

/// Why playback last entered a paused condition. Tracked for observability;
/// resume decisions never branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    UserRequest,
    FocusLoss,
}

/// A command deferred while the catalog is still indexing. Consumed exactly
/// once when the catalog becomes ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Explicit source to play, `None` for a random pick.
    pub source: Option<TrackSource>,
    /// Whether playback should actually begin once the catalog is ready.
    pub autoplay: bool,
}

/// The item currently owned by the controller, published read-only to the
/// notification surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub source: TrackSource,
}

impl NowPlaying {
    pub fn from_item(item: &MediaItem) -> Self {
        Self {
            title: item.display_title().to_string(),
            artist: item.artist.clone(),
            album: item.album.clone(),
            duration: item.duration,
            source: item.source.clone(),
        }
    }
}

/// Point-in-time view of the controller, served through
/// [`ControllerHandle::snapshot`](crate::controller::ControllerHandle::snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub state: PlaybackState,
    pub focus: AudioFocus,
    pub pause_reason: PauseReason,
    pub now_playing: Option<NowPlaying>,
    pub is_streaming: bool,
}
