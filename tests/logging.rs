use std::rc::Rc;
use std::{fs, thread::sleep, time::Duration};

use reading_mask::headless::{FrameExposure, FrameSpec, HeadlessHost};
use reading_mask::mask::{ReadingMask, Size};
use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn debug_file_sink_records_mask_activity() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mask.log");

    std::env::remove_var("RUST_LOG");
    reading_mask::logging::init(true, Some(path.clone()));

    let host = Rc::new(HeadlessHost::new(Size::new(800.0, 600.0)));
    host.add_frame(FrameSpec::new(Size::new(400.0, 300.0)).exposure(FrameExposure::Denied));
    let mask = ReadingMask::new(host.clone());
    mask.initialize();
    mask.remove_canvas();

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("reading mask enabled"));
    assert!(contents.contains("reading mask disabled"));
    // Frame lookup misses are only visible at debug level.
    assert!(contents.contains("frame window lookup failed"));
    assert!(!contents.contains("\x1b["), "file output must not carry ANSI colours");
}
