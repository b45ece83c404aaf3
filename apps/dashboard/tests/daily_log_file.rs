use dashboard::Config;
use tempfile::TempDir;

// The subscriber is process-global, so this binary holds exactly one test.
#[test]
fn error_lines_reach_the_daily_file_once_the_guard_drops() {
    let dir = TempDir::new().expect("tempdir");
    let config = Config {
        log_dir: dir.path().join("logs"),
        ..Config::default()
    };

    let guard = dashboard::logging::init(&config).expect("init logging");
    tracing::error!(operation = "upload", "operation failed");
    drop(guard);

    let mut entries = std::fs::read_dir(&config.log_dir)
        .expect("read log dir")
        .map(|e| e.expect("dir entry").file_name().into_string().expect("utf8 name"))
        .collect::<Vec<_>>();
    entries.sort();
    assert_eq!(entries.len(), 1, "expected one daily log file, got {entries:?}");
    assert!(
        entries[0].starts_with("soxdash.") && entries[0].ends_with(".log"),
        "unexpected log file name {}",
        entries[0]
    );

    let contents =
        std::fs::read_to_string(config.log_dir.join(&entries[0])).expect("read log file");
    assert!(
        contents.contains("operation failed"),
        "error line missing from log file: {contents}"
    );
}
