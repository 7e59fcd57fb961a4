//! Fail-loud behaviour when the process logger is missing

use http::Extensions;
use logkit::{LogError, LoggerConfig};
use tests::logdir::TestLogDir;

#[test]
#[should_panic(expected = "logger used before initialize")]
fn test_current_before_initialize_panics() {
    logkit::current();
}

#[test]
fn test_try_current_is_none() {
    assert!(logkit::try_current().is_none());
}

#[test]
#[should_panic(expected = "logger used before initialize")]
fn test_unbound_context_before_initialize_panics() {
    logkit::from_context(&Extensions::new());
}

#[test]
fn test_bound_context_works_without_process_logger() {
    let dir = TestLogDir::new();
    let logger = logkit::Logger::build(&dir.config("info", "ctx.log")).expect("Failed to build logger");

    let mut ext = Extensions::new();
    logkit::with_logger(&mut ext, logger.clone());

    assert!(logkit::Logger::ptr_eq(&logkit::from_context(&ext), &logger));
}

#[test]
fn test_failed_initialize_leaves_process_uninitialized() {
    let dir = TestLogDir::new();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    let config = LoggerConfig::new("svc", "demo", "info", format!("{}/", blocker.display()), "app.log");
    let err = logkit::try_initialize(&config).unwrap_err();

    assert!(matches!(err, LogError::CreateDir { .. }));
    assert!(logkit::try_current().is_none());
}

#[test]
#[should_panic(expected = "failed to initialize logger")]
fn test_initialize_with_unusable_directory_panics() {
    let dir = TestLogDir::new();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    let config = LoggerConfig::new("svc", "demo", "info", format!("{}/", blocker.display()), "app.log");
    logkit::initialize(&config);
}
