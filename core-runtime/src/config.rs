//! Controller configuration.
//!
//! A [`CoreConfig`] bundles every bridge handle the playback controller
//! drives plus the few tuning knobs the domain has. Construction goes
//! through [`CoreConfig::builder`]; `build()` fills optional handles with
//! desktop shims (behind the `desktop-shims` feature) and validates the
//! result, so a missing capability or bad tuning value surfaces at startup
//! rather than mid-playback.
//!
//! The engine factory and the catalog are always host-provided; there is no
//! sensible stand-in for either. Focus arbitration, the keepalive token and
//! the two notification surfaces fall back to the shims when unset.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_factory(Arc::new(MyEngineFactory))
//!     .catalog(Arc::new(MyCatalog))
//!     .duck_volume(0.2)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    AudioFocusService, EngineFactory, MediaCatalog, NetworkKeepalive, StatusNotifier,
    TransportControls,
};
use std::sync::Arc;

/// Volume applied while another application holds focus in a duckable mode.
pub const DEFAULT_DUCK_VOLUME: f32 = 0.1;

/// Title line shown on the persistent status surface.
pub const DEFAULT_SERVICE_LABEL: &str = "Audio Player";

/// Configuration for the playback controller.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    // NOTE: `CoreConfig` has a manual `Debug` impl below because several
    // fields are `Arc<dyn Trait>` without a `Debug` bound.
    /// Opens decode-engine instances (required).
    pub engine_factory: Arc<dyn EngineFactory>,

    /// Item catalog (required).
    pub catalog: Arc<dyn MediaCatalog>,

    /// Audio-focus arbiter adapter.
    pub focus: Arc<dyn AudioFocusService>,

    /// Keepalive token held while streaming remote sources.
    pub keepalive: Arc<dyn NetworkKeepalive>,

    /// Persistent status surface.
    pub status: Arc<dyn StatusNotifier>,

    /// Remote transport controls.
    pub transport: Arc<dyn TransportControls>,

    /// Title line for status updates.
    pub service_label: String,

    /// Playback volume while ducked, `0.0..=1.0`.
    pub duck_volume: f32,

    /// Buffer size of the player event bus.
    pub event_capacity: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("service_label", &self.service_label)
            .field("duck_volume", &self.duck_volume)
            .field("event_capacity", &self.event_capacity)
            .finish_non_exhaustive()
    }
}

impl CoreConfig {
    /// Start building a configuration.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Check tuning values for consistency.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.duck_volume) {
            return Err(Error::Config(format!(
                "duck_volume must be within 0.0..=1.0, got {}",
                self.duck_volume
            )));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        if self.service_label.is_empty() {
            return Err(Error::Config("service_label must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    engine_factory: Option<Arc<dyn EngineFactory>>,
    catalog: Option<Arc<dyn MediaCatalog>>,
    focus: Option<Arc<dyn AudioFocusService>>,
    keepalive: Option<Arc<dyn NetworkKeepalive>>,
    status: Option<Arc<dyn StatusNotifier>>,
    transport: Option<Arc<dyn TransportControls>>,
    service_label: Option<String>,
    duck_volume: Option<f32>,
    event_capacity: Option<usize>,
}

impl CoreConfigBuilder {
    pub fn engine_factory(mut self, factory: Arc<dyn EngineFactory>) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn MediaCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn focus(mut self, focus: Arc<dyn AudioFocusService>) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn keepalive(mut self, keepalive: Arc<dyn NetworkKeepalive>) -> Self {
        self.keepalive = Some(keepalive);
        self
    }

    pub fn status(mut self, status: Arc<dyn StatusNotifier>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn TransportControls>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn service_label(mut self, label: impl Into<String>) -> Self {
        self.service_label = Some(label.into());
        self
    }

    pub fn duck_volume(mut self, volume: f32) -> Self {
        self.duck_volume = Some(volume);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Finish the configuration, injecting desktop defaults where available
    /// and failing fast on anything still missing.
    pub fn build(self) -> Result<CoreConfig> {
        let engine_factory = self.engine_factory.ok_or_else(|| missing(
            "EngineFactory",
            "No decode-engine factory provided. Inject the host's media engine adapter.",
        ))?;
        let catalog = self.catalog.ok_or_else(|| missing(
            "MediaCatalog",
            "No item catalog provided. Inject the host's catalog adapter.",
        ))?;

        let focus = match self.focus {
            Some(focus) => focus,
            None => default_focus()?,
        };
        let keepalive = match self.keepalive {
            Some(keepalive) => keepalive,
            None => default_keepalive()?,
        };
        let status = match self.status {
            Some(status) => status,
            None => default_status()?,
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };

        let config = CoreConfig {
            engine_factory,
            catalog,
            focus,
            keepalive,
            status,
            transport,
            service_label: self
                .service_label
                .unwrap_or_else(|| DEFAULT_SERVICE_LABEL.to_string()),
            duck_volume: self.duck_volume.unwrap_or(DEFAULT_DUCK_VOLUME),
            event_capacity: self
                .event_capacity
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
        };
        config.validate()?;
        Ok(config)
    }
}

fn missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn default_focus() -> Result<Arc<dyn AudioFocusService>> {
    Ok(Arc::new(bridge_desktop::UnarbitratedFocus::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_focus() -> Result<Arc<dyn AudioFocusService>> {
    Err(missing(
        "AudioFocusService",
        "No focus adapter provided. Enable the desktop-shims feature or inject one.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn default_keepalive() -> Result<Arc<dyn NetworkKeepalive>> {
    Ok(Arc::new(bridge_desktop::ProcessKeepalive::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_keepalive() -> Result<Arc<dyn NetworkKeepalive>> {
    Err(missing(
        "NetworkKeepalive",
        "No keepalive adapter provided. Enable the desktop-shims feature or inject one.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn default_status() -> Result<Arc<dyn StatusNotifier>> {
    Ok(Arc::new(bridge_desktop::LogStatusNotifier::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_status() -> Result<Arc<dyn StatusNotifier>> {
    Err(missing(
        "StatusNotifier",
        "No status surface provided. Enable the desktop-shims feature or inject one.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn default_transport() -> Result<Arc<dyn TransportControls>> {
    Ok(Arc::new(bridge_desktop::LogTransportControls::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_transport() -> Result<Arc<dyn TransportControls>> {
    Err(missing(
        "TransportControls",
        "No transport-control surface provided. Enable the desktop-shims feature or inject one.",
    ))
}
