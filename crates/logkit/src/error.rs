//! Error types

use std::io;
use std::path::PathBuf;

/// Errors raised while configuring a logger.
///
/// Only setup paths return these. Failures while writing entries are never
/// reported to the code that logs.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to create log directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {path:?}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read logger config {path:?}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid logger config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LogError>;
