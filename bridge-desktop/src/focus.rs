//! Audio Focus Shim
//!
//! Desktop hosts have no system-wide audio-focus arbiter. This adapter
//! models that environment as focus being permanently granted: requests
//! succeed synchronously, abandoning releases nothing, and the change
//! stream closes immediately because no external party can revoke focus.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::focus::{AudioFocusService, FocusChange, FocusChangeStream, FocusResponse};
use tracing::debug;

/// Focus service for hosts without an arbiter.
#[derive(Debug, Default)]
pub struct UnarbitratedFocus;

impl UnarbitratedFocus {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioFocusService for UnarbitratedFocus {
    async fn request_focus(&self) -> Result<FocusResponse> {
        debug!("no focus arbiter on this host, granting synchronously");
        Ok(FocusResponse::Granted)
    }

    async fn abandon_focus(&self) -> Result<bool> {
        // Nothing was ever held with an external arbiter.
        Ok(false)
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn FocusChangeStream>> {
        Ok(Box::new(ClosedFocusStream))
    }
}

struct ClosedFocusStream;

#[async_trait]
impl FocusChangeStream for ClosedFocusStream {
    async fn next(&mut self) -> Option<FocusChange> {
        None
    }
}
