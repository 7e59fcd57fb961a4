//! Shared test utilities and fixtures for logkit integration tests.

/// Log directory helpers
pub mod logdir {
    use logkit::LoggerConfig;
    use std::path::{Path, PathBuf};
    use std::sync::OnceLock;
    use tempfile::TempDir;

    /// Base file name used by fixtures
    pub const LOG_FILE: &str = "app.log";

    /// Temporary directory holding one logger's files
    pub struct TestLogDir {
        temp_dir: TempDir,
    }

    impl TestLogDir {
        pub fn new() -> Self {
            Self {
                temp_dir: TempDir::new().expect("Failed to create temp dir"),
            }
        }

        pub fn path(&self) -> &Path {
            self.temp_dir.path()
        }

        /// Directory as a config prefix (with trailing separator)
        pub fn prefix(&self) -> String {
            format!("{}/", self.temp_dir.path().display())
        }

        /// Config writing `filename` into this directory
        pub fn config(&self, level: &str, filename: &str) -> LoggerConfig {
            LoggerConfig::new("svc", "demo", level, self.prefix(), filename)
        }

        /// Dated files (everything except links and hidden files)
        pub fn dated_files(&self) -> Vec<PathBuf> {
            let mut files: Vec<PathBuf> = std::fs::read_dir(self.path())
                .expect("Failed to read log dir")
                .filter_map(|entry| entry.ok())
                .filter(|entry| {
                    entry
                        .file_type()
                        .map(|t| t.is_file())
                        .unwrap_or(false)
                })
                .map(|entry| entry.path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| !n.starts_with('.'))
                })
                .collect();
            files.sort();
            files
        }
    }

    impl Default for TestLogDir {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Directory shared by every test in one test binary.
    ///
    /// The process logger outlives individual tests, so its directory must too.
    pub fn shared() -> &'static TestLogDir {
        static DIR: OnceLock<TestLogDir> = OnceLock::new();
        DIR.get_or_init(TestLogDir::new)
    }
}

/// Helpers for inspecting written lines
pub mod lines {
    use std::path::Path;

    /// Lines of a log file (empty when it does not exist)
    pub fn read(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Number of lines containing `needle`
    pub fn count(lines: &[String], needle: &str) -> usize {
        lines.iter().filter(|l| l.contains(needle)).count()
    }
}
