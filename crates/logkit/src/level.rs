//! Severity levels and the runtime threshold

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::subscriber::Interest;
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Target attached to every event emitted through a [`crate::Logger`] handle.
///
/// Those events have already passed the threshold check in the handle, which
/// knows the exact severity (tracing only sees `ERROR` for the terminal ones).
pub(crate) const HANDLE_TARGET: &str = "logkit::handle";

/// Log severity, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    /// Panics after writing when the logger runs in development mode
    DPanic = 4,
    /// Panics after writing
    Panic = 5,
    /// Exits the process after writing
    Fatal = 6,
}

impl Severity {
    pub const ALL: [Severity; 7] = [
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::DPanic,
        Self::Panic,
        Self::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::DPanic => "dpanic",
            Self::Panic => "panic",
            Self::Fatal => "fatal",
        }
    }

    /// Exact, case-sensitive lookup of a severity name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "dpanic" => Some(Self::DPanic),
            "panic" => Some(Self::Panic),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }

    /// Tracing level an entry of this severity is emitted at
    pub fn tracing_level(&self) -> Level {
        match self {
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error | Self::DPanic | Self::Panic | Self::Fatal => Level::ERROR,
        }
    }

    /// Severity of a plain tracing event (TRACE folds into debug)
    pub fn from_tracing(level: &Level) -> Self {
        match *level {
            Level::TRACE | Level::DEBUG => Self::Debug,
            Level::INFO => Self::Info,
            Level::WARN => Self::Warn,
            _ => Self::Error,
        }
    }

    fn from_u8(raw: u8) -> Self {
        Self::ALL
            .get(raw as usize)
            .copied()
            .unwrap_or(Self::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a level name from configuration.
///
/// Total: anything that is not one of the seven names (including a different
/// case or an empty string) resolves to [`Severity::Info`].
pub fn resolve(name: &str) -> Severity {
    Severity::parse(name).unwrap_or(Severity::Info)
}

/// Minimum severity shared by a logger and every handle derived from it.
///
/// Stored as a single atomic byte, so readers see either the old or the new
/// threshold.
#[derive(Debug, Clone)]
pub struct AtomicLevel {
    inner: Arc<AtomicU8>,
}

impl AtomicLevel {
    pub fn new(level: Severity) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    pub fn get(&self) -> Severity {
        Severity::from_u8(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, level: Severity) {
        self.inner.store(level as u8, Ordering::Release);
    }

    /// Whether an entry at `severity` passes the threshold
    pub fn allows(&self, severity: Severity) -> bool {
        severity >= self.get()
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl<S: Subscriber> Layer<S> for AtomicLevel {
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        // The threshold can move at any time; never let a callsite be cached.
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        if !metadata.is_event() || metadata.target() == HANDLE_TARGET {
            return true;
        }
        self.allows(Severity::from_tracing(metadata.level()))
    }
}
