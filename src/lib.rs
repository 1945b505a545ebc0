//! Workspace façade crate.
//!
//! Re-exports the playback-controller crates so host applications can depend
//! on `bpc-workspace` alone: `bridge-traits` for the adapter contracts to
//! implement, `core-runtime` for configuration, logging and the event bus,
//! and `core-playback` for the controller itself. The `desktop-shims`
//! feature (on by default) makes `core-runtime` inject the desktop adapters
//! for any bridge handle left unset.
//!
//! ```ignore
//! use bpc_workspace::config::CoreConfig;
//! use bpc_workspace::playback::Player;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_factory(Arc::new(MyEngineFactory))
//!     .catalog(Arc::new(MyCatalog))
//!     .build()?;
//! let player = Player::spawn(config);
//! player.handle().play()?;
//! ```

pub use bridge_traits as bridge;
pub use core_playback as playback;
pub use core_runtime as runtime;

pub use core_playback::{Command, ControllerHandle, Player};
pub use core_runtime::config;
pub use core_runtime::events;
