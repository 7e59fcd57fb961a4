//! Logger configuration

use crate::error::{LogError, Result};
use crate::level::{self, Severity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration passed once to [`crate::initialize`].
///
/// `output_dir` and `filename` are joined by plain concatenation, so a
/// directory is normally given with its trailing separator (`"/var/log/app/"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Namespace attached to every entry
    pub namespace: String,

    /// Project name attached to every entry
    pub project: String,

    /// Minimum severity name; unknown or empty means info
    pub level: String,

    /// Directory prefix for the dated files and the link
    #[serde(alias = "out_put_dir")]
    pub output_dir: String,

    /// Base name of the link, also embedded in every dated file name
    pub filename: String,
}

impl LoggerConfig {
    pub fn new(
        namespace: impl Into<String>,
        project: impl Into<String>,
        level: impl Into<String>,
        output_dir: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            project: project.into(),
            level: level.into(),
            output_dir: output_dir.into(),
            filename: filename.into(),
        }
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LogError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Resolved threshold
    pub fn severity(&self) -> Severity {
        level::resolve(&self.level)
    }

    /// Stable path that always resolves to the current file
    pub fn link_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.output_dir, self.filename))
    }
}
