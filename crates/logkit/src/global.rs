//! Process-wide logger
//!
//! The first successful [`initialize`] builds the logger. Every later call,
//! concurrent or not, is a no-op that returns the same handle.

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::logger::Logger;
use std::sync::{Mutex, OnceLock, PoisonError};

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Serialises construction; concurrent callers wait here until the first
/// build finishes.
static INIT: Mutex<()> = Mutex::new(());

/// Build the process logger from `config`, unless one already exists.
///
/// On success the logger is also installed as the global `tracing`
/// dispatcher when no other one has been set. A failed build leaves the
/// process uninitialised.
pub fn try_initialize(config: &LoggerConfig) -> Result<&'static Logger> {
    if let Some(logger) = LOGGER.get() {
        return Ok(logger);
    }

    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(logger) = LOGGER.get() {
        return Ok(logger);
    }

    let logger = Logger::build(config)?;
    let _ = tracing::dispatcher::set_global_default(logger.dispatch().clone());

    Ok(LOGGER.get_or_init(|| logger))
}

/// Build the process logger, aborting startup if the sink cannot be opened.
///
/// # Panics
///
/// Panics when the output directory or file is unusable.
pub fn initialize(config: &LoggerConfig) -> &'static Logger {
    match try_initialize(config) {
        Ok(logger) => logger,
        Err(e) => panic!("failed to initialize logger: {}", e),
    }
}

/// The process logger.
///
/// # Panics
///
/// Panics when called before [`initialize`]; initialization must happen first.
pub fn current() -> &'static Logger {
    match LOGGER.get() {
        Some(logger) => logger,
        None => panic!("logger used before initialize"),
    }
}

/// The process logger, if it has been initialized
pub fn try_current() -> Option<&'static Logger> {
    LOGGER.get()
}
