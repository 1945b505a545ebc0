//! Runtime infrastructure shared by the playback crates: structured
//! logging setup ([`logging`]), the fail-fast controller configuration
//! ([`config`]), and the broadcast bus carrying player transitions to
//! in-process listeners ([`events`]).

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
