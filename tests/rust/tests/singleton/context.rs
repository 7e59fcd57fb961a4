//! Context carrier fallback to the process logger

use http::Extensions;
use logkit::Logger;
use tests::logdir;

fn init() -> &'static Logger {
    logkit::initialize(&logdir::shared().config("info", "app-context.log"))
}

#[test]
fn test_unbound_context_falls_back_to_process_logger() {
    let process = init();
    let found = logkit::from_context(&Extensions::new());
    assert!(Logger::ptr_eq(&found, process));
}

#[test]
fn test_bound_context_overrides_process_logger() {
    let process = init();
    let request = process.with(&[("request_id", &"r-42")]);

    let mut ext = Extensions::new();
    logkit::with_logger(&mut ext, request.clone());

    let found = logkit::from_context(&ext);
    assert!(Logger::ptr_eq(&found, &request));
    assert!(!Logger::ptr_eq(&found, process));
}

#[test]
fn test_request_carries_logger_through_parts() {
    let process = init();
    let named = process.named("http");

    let mut request = http::Request::builder()
        .uri("/orders")
        .body(())
        .unwrap();
    logkit::with_logger(&mut request, named.clone());

    let (parts, _) = request.into_parts();
    assert_eq!(logkit::from_context(&parts).name(), "http");
}
