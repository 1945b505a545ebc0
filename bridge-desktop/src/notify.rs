//! Notification Surface Shims
//!
//! Desktop builds without a real status surface or media-key integration
//! mirror every update into the tracing log. Useful on headless hosts and as
//! the injected default when nothing better is configured.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::notify::{
    StatusNotifier, StatusUpdate, TrackMetadata, TransportControls, TransportState,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Status surface that logs instead of displaying.
#[derive(Debug, Default)]
pub struct LogStatusNotifier;

impl LogStatusNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StatusNotifier for LogStatusNotifier {
    async fn publish(&self, update: StatusUpdate) -> Result<()> {
        info!(title = %update.title, phase = %update.phase_text, "status update");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        info!("status surface cleared");
        Ok(())
    }
}

/// Transport-control surface that logs instead of driving media keys.
#[derive(Debug, Default)]
pub struct LogTransportControls {
    registered: AtomicBool,
}

impl LogTransportControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportControls for LogTransportControls {
    async fn register(&self) -> Result<()> {
        if !self.registered.swap(true, Ordering::SeqCst) {
            info!("transport controls registered");
        }
        Ok(())
    }

    async fn set_playback_state(&self, state: TransportState) -> Result<()> {
        if !self.is_registered() {
            warn!(?state, "transport state update before registration");
        }
        info!(?state, "transport state");
        Ok(())
    }

    async fn set_metadata(&self, metadata: TrackMetadata) -> Result<()> {
        info!(
            title = metadata.title.as_deref().unwrap_or("<unknown>"),
            artist = metadata.artist.as_deref().unwrap_or("<unknown>"),
            album = metadata.album.as_deref().unwrap_or("<unknown>"),
            "transport metadata"
        );
        Ok(())
    }
}
