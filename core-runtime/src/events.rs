//! # Event Bus
//!
//! Broadcast channel carrying playback transitions to in-process listeners
//! (typically the surface that issues commands), built on
//! `tokio::sync::broadcast`.
//!
//! Subscribers that fall behind receive `RecvError::Lagged` and keep
//! receiving newer events; `RecvError::Closed` signals shutdown. Emitting
//! with no subscribers is not an error from the controller's point of view -
//! the bus is observability, not control flow.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, PlayerEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(64);
//! let mut listener = bus.subscribe();
//!
//! bus.emit(PlayerEvent::Paused).ok();
//! assert_eq!(listener.recv().await.unwrap(), PlayerEvent::Paused);
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

/// Playback transitions published by the controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum PlayerEvent {
    /// The item catalog finished indexing.
    CatalogReady,
    /// A new item started preparing.
    TrackChanged { title: String, source: String },
    /// The prepared item started producing sound.
    Started { title: String },
    /// Playback paused on user request.
    Paused,
    /// Playback resumed from pause.
    Resumed,
    /// Playback fully stopped and all resources released.
    Stopped,
    /// The current item played to its natural end.
    PlaybackEnded { source: String },
    /// A random pick found the catalog empty.
    NoItemsAvailable,
    /// Playback failed; `message` is user-presentable.
    Error { message: String },
}

impl PlayerEvent {
    /// Short label for log lines and debugging surfaces.
    pub fn description(&self) -> &'static str {
        match self {
            PlayerEvent::CatalogReady => "catalog ready",
            PlayerEvent::TrackChanged { .. } => "track changed",
            PlayerEvent::Started { .. } => "playback started",
            PlayerEvent::Paused => "playback paused",
            PlayerEvent::Resumed => "playback resumed",
            PlayerEvent::Stopped => "playback stopped",
            PlayerEvent::PlaybackEnded { .. } => "item finished",
            PlayerEvent::NoItemsAvailable => "no items available",
            PlayerEvent::Error { .. } => "playback error",
        }
    }
}

/// Central broadcast channel for [`PlayerEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are none.
    pub fn emit(&self, event: PlayerEvent) -> Result<usize, SendError<PlayerEvent>> {
        self.sender.send(event)
    }

    /// Create an independent receiver for all future events. Past events are
    /// not replayed.
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
