//! # Playback Core
//!
//! The background playback controller: a state machine that owns the decode
//! session, audio focus, the streaming keepalive token and the deferred
//! command slot, drives the host adapters from `bridge-traits`, and mirrors
//! every transition to the notification surfaces and the player event bus.
//!
//! ## Overview
//!
//! - [`controller`] - the state machine task, its command surface and
//!   lifecycle ([`Player`], [`ControllerHandle`])
//! - [`engine`] - the decode-resource manager ([`EngineController`])
//! - [`types`] - playback state, focus standing, deferred requests
//! - [`error`] - the [`PlaybackError`] taxonomy

pub mod controller;
pub mod engine;
pub mod error;
pub mod types;

pub use controller::{Command, ControllerHandle, Player};
pub use engine::{EngineController, SessionId};
pub use error::{PlaybackError, Result};
pub use types::{
    AudioFocus, NowPlaying, PauseReason, PendingRequest, PlaybackState, StateSnapshot,
};
