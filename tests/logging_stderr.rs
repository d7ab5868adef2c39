use std::{thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    reading_mask::logging::init(false, None);
    tracing::info!("test");

    sleep(Duration::from_millis(100));

    assert!(!path.exists(), "log file should not be created");
}

#[test]
#[serial]
fn repeated_init_is_harmless() {
    reading_mask::logging::init(false, None);
    reading_mask::logging::init(true, None);
    tracing::debug!("still logging");
}
