//! Runtime-adjustable log verbosity shared by the subscriber and the admin API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::Interest;
use tracing::{Level, Metadata};
use tracing_subscriber::layer::{Context, Filter};

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid log level: {input}")]
pub struct InvalidLevelError {
    pub input: String,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a configured level, falling back to `info` when the value is
    /// missing or not one of the four known names.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }

    /// Whether a record of `level` passes this threshold.
    pub fn allows(&self, level: &Level) -> bool {
        *level <= self.level_filter()
    }

    fn from_repr(value: u8) -> Self {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = InvalidLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(InvalidLevelError {
                input: other.to_string(),
            }),
        }
    }
}

/// Owned handle to the process log level.
///
/// Clones share the same value: the subscriber holds one clone as its
/// per-layer filter and the admin handlers hold another through `AppState`.
#[derive(Debug, Clone)]
pub struct LogLevelController {
    current: Arc<AtomicU8>,
}

impl LogLevelController {
    pub fn new(initial: LogLevel) -> Self {
        Self {
            current: Arc::new(AtomicU8::new(initial as u8)),
        }
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_repr(self.current.load(Ordering::Acquire))
    }

    /// Replaces the current level. Invalid input leaves the level untouched.
    pub fn set_level(&self, candidate: &str) -> Result<LogLevel, InvalidLevelError> {
        let level: LogLevel = candidate.parse()?;
        self.current.store(level as u8, Ordering::Release);
        Ok(level)
    }

    pub fn allows(&self, level: &Level) -> bool {
        self.level().allows(level)
    }
}

impl Default for LogLevelController {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

// Interest is always `sometimes` so callsites are re-evaluated on every
// record and a level change takes effect immediately.
impl<S> Filter<S> for LogLevelController {
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        self.allows(meta.level())
    }

    fn callsite_enabled(&self, _meta: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(LevelFilter::DEBUG)
    }
}
