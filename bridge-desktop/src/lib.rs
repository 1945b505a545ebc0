//! Desktop host shims for the bridge traits.
//!
//! These adapters stand in for platform services a desktop host either does
//! not have (audio-focus arbitration, radio keepalive) or does not need to
//! wire for tests and demos (notification surfaces, a scanned library).
//! `core-runtime` injects them as defaults behind its `desktop-shims`
//! feature.

pub mod catalog;
pub mod focus;
pub mod network;
pub mod notify;

pub use catalog::{IndexingHandle, StaticCatalog};
pub use focus::UnarbitratedFocus;
pub use network::ProcessKeepalive;
pub use notify::{LogStatusNotifier, LogTransportControls};
