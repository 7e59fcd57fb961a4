//! # logkit
//!
//! Process-wide structured logger writing console-style lines to a daily
//! rotating file.
//!
//! ## Modules
//!
//! - `level` - Severity names, resolution and the runtime threshold
//! - `sink` - Daily rotating file with a stable link and retention
//! - `format` - `key=value` line encoder
//! - `logger` - Logger handle and the two-pipeline core behind it
//! - `global` - Initialize-once process logger
//! - `context` - Carrying a logger through request extensions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use logkit::LoggerConfig;
//!
//! let config = LoggerConfig::new("svc", "demo", "info", "/var/log/demo/", "app.log");
//! logkit::initialize(&config);
//!
//! logkit::current().infow("listening", &[("port", &8080)]);
//! tracing::warn!("plain tracing events land in the same file");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod global;
pub mod level;
pub mod logger;
pub mod sink;

pub use config::LoggerConfig;
pub use context::{bound_logger, from_context, with_logger, Carrier, LoggerKey};
pub use error::{LogError, Result};
pub use format::Millis;
pub use global::{current, initialize, try_current, try_initialize};
pub use level::{resolve, AtomicLevel, Severity};
pub use logger::{Fields, Logger, LoggerBuilder};
pub use sink::{Clock, RotatingFile, SinkOptions, SystemClock};
