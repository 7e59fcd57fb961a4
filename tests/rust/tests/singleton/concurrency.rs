//! Concurrent first-call initialization

use logkit::Logger;
use std::sync::{Arc, Barrier};
use tests::logdir;

#[test]
fn test_concurrent_initialize_builds_once() {
    const CALLERS: usize = 16;
    let dir = logdir::shared();
    let barrier = Arc::new(Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|i| {
            let barrier = barrier.clone();
            // Each caller brings a different config; only one may be used.
            let config = dir.config(if i % 2 == 0 { "debug" } else { "error" }, &format!("app-{}.log", i));
            std::thread::spawn(move || {
                barrier.wait();
                logkit::initialize(&config)
            })
        })
        .collect();

    let loggers: Vec<&'static Logger> = handles
        .into_iter()
        .map(|h| h.join().expect("initialize panicked"))
        .collect();

    let current = logkit::current();
    for logger in &loggers {
        assert!(Logger::ptr_eq(logger, current));
    }

    // Exactly one construction happened in this process: one dated file.
    assert_eq!(dir.dated_files().len(), 1, "{:?}", dir.dated_files());
}

#[test]
fn test_later_initialize_is_ignored() {
    let dir = logdir::shared();
    let first = logkit::initialize(&dir.config("info", "app-first.log"));
    let second = logkit::initialize(&dir.config("fatal", "app-second.log"));

    assert!(Logger::ptr_eq(first, second));
    assert!(Logger::ptr_eq(second, logkit::current()));
    assert_eq!(dir.dated_files().len(), 1);
}

#[test]
fn test_current_after_initialize_never_panics() {
    let dir = logdir::shared();
    logkit::initialize(&dir.config("info", "app-current.log"));

    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| logkit::try_current().is_some()))
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
    logkit::current().info("still here");
}
