//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the
//! platform-specific services it depends on. Each trait represents a
//! capability the core requires but that is provided differently per host.
//!
//! ## Traits
//!
//! ### Playback
//! - [`MediaEngine`](engine::MediaEngine) / [`EngineFactory`](engine::EngineFactory) -
//!   Decode-engine instances with async load and an event stream
//! - [`MediaCatalog`](catalog::MediaCatalog) - Item source with async readiness and random pick
//!
//! ### Platform Integration
//! - [`AudioFocusService`](focus::AudioFocusService) - Audio-focus arbitration
//! - [`NetworkKeepalive`](network::NetworkKeepalive) - Keepalive token held while streaming
//!
//! ### Notification Surfaces
//! - [`StatusNotifier`](notify::StatusNotifier) - Persistent status display
//! - [`TransportControls`](notify::TransportControls) - Remote transport controls
//!
//! Hosts without a given service inject the corresponding shim from
//! `bridge-desktop` (e.g. a permanently-granted focus service) rather than
//! leaving the capability unset; the core fails fast on missing handles.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod focus;
pub mod network;
pub mod notify;

pub use catalog::MediaCatalog;
pub use engine::{
    EngineEvent, EngineEventStream, EngineFactory, MediaEngine, MediaItem, TrackSource,
};
pub use error::{BridgeError, Result};
pub use focus::{AudioFocusService, FocusChange, FocusChangeStream, FocusResponse};
pub use network::NetworkKeepalive;
pub use notify::{StatusNotifier, StatusUpdate, TrackMetadata, TransportControls, TransportState};
