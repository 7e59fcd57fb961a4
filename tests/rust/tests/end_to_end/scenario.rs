//! Threshold, duplicate pipelines and the stable link, observed on disk

use logkit::Logger;
use pretty_assertions::assert_eq;
use tests::lines;
use tests::logdir::{self, LOG_FILE};

fn init() -> &'static Logger {
    logkit::initialize(&logdir::shared().config("warn", LOG_FILE))
}

/// Lines of today's file; read through the link where links exist.
fn written() -> Vec<String> {
    let logger = init();
    if cfg!(unix) {
        lines::read(&logdir::shared().path().join(LOG_FILE))
    } else {
        lines::read(&logger.sink().current_path())
    }
}

#[test]
fn test_warn_threshold_scenario() {
    let logger = init();

    logger.info("e2e info entry");
    logger.error("e2e error entry");

    let lines = written();
    assert_eq!(lines::count(&lines, "e2e info entry"), 0);
    // One line per pipeline; warn+ entries are not deduplicated.
    assert_eq!(lines::count(&lines, "msg=e2e error entry"), 2);

    let line = lines
        .iter()
        .find(|l| l.contains("msg=e2e error entry"))
        .unwrap();
    assert!(line.starts_with("time="), "{}", line);
    assert!(line.contains(" level=error "), "{}", line);
    assert!(line.contains(" file=end_to_end/scenario.rs:"), "{}", line);
    assert!(line.ends_with(" namespace=svc project=demo"), "{}", line);
}

#[test]
fn test_dated_file_behind_link() {
    let logger = init();
    logger.warn("e2e dated");

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let expected = logdir::shared().path().join(format!("{}{}", today, LOG_FILE));

    // Built just now; a midnight crossing mid-test is the only way this differs.
    if logger.sink().current_path() == expected {
        assert!(expected.exists());
        #[cfg(unix)]
        assert_eq!(
            std::fs::read_link(logdir::shared().path().join(LOG_FILE)).unwrap(),
            std::path::PathBuf::from(format!("{}{}", today, LOG_FILE))
        );
    }
}

#[test]
fn test_plain_tracing_events_reach_the_file() {
    init();

    tracing::info!("e2e tracing info");
    tracing::warn!(attempt = 3, "e2e tracing warn");

    let lines = written();
    assert_eq!(lines::count(&lines, "e2e tracing info"), 0);
    assert_eq!(lines::count(&lines, "msg=e2e tracing warn attempt=3"), 2);
}
