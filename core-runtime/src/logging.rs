//! Structured logging for the playback workspace.
//!
//! One [`init_logging`] call at startup wires the `tracing-subscriber`
//! stack: an `EnvFilter` derived from [`LoggingConfig`] plus a format layer
//! chosen by [`LogFormat`]. Debug builds default to pretty multi-line
//! output, release builds to JSON lines. Everything after that is plain
//! `tracing` macros in the individual crates.
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogLevel, LoggingConfig};
//!
//! init_logging(LoggingConfig::default().with_level(LogLevel::Debug))?;
//! tracing::info!("playback controller starting");
//! ```

use crate::error::{Error, Result};
use std::io;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Shape of the emitted log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored output for development.
    Pretty,
    /// One line per event, still human-oriented.
    Compact,
    /// JSON lines for log collectors.
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        }
    }
}

/// Least severe level the workspace crates emit at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Options consumed by [`init_logging`].
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Full filter override, e.g. `"core_playback=trace,tokio=warn"`. When
    /// unset, a per-crate filter is derived from `level`.
    pub filter: Option<String>,
    /// Include the emitting module path in each line.
    pub include_target: bool,
    /// Include the thread id in each line.
    pub include_thread_ids: bool,
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    pub fn with_thread_ids(mut self, include: bool) -> Self {
        self.include_thread_ids = include;
        self
    }
}

/// Install the global subscriber. Call once during startup; a second call
/// fails because the global dispatcher is already set.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = env_filter(&config)?;
    let fmt = tracing_subscriber::fmt::layer()
        .with_target(config.include_target)
        .with_thread_ids(config.include_thread_ids)
        .with_writer(io::stdout);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Pretty => registry.with(fmt.pretty()).try_init(),
        LogFormat::Compact => registry.with(fmt.compact()).try_init(),
        LogFormat::Json => registry.with(fmt.json().flatten_event(true)).try_init(),
    }
    .map_err(|err| Error::Logging(err.to_string()))
}

fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = match &config.filter {
        Some(custom) => custom.clone(),
        // Workspace crates at the configured level, dependencies at warn.
        None => {
            let level = config.level.directive();
            format!(
                "core_runtime={level},core_playback={level},bridge_desktop={level},tokio=warn"
            )
        }
    };

    EnvFilter::try_new(&directives)
        .map_err(|err| Error::Config(format!("bad log filter '{directives}': {err}")))
}
