use std::rc::Rc;
use std::sync::{Arc, Mutex};

use reading_mask::headless::{FrameSpec, HeadlessHost};
use reading_mask::logging::LineWriter;
use reading_mask::mask::{ReadingMask, Size};

fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || {
            let sink = sink.clone();
            LineWriter::new(move |line: &str| sink.lock().unwrap().push(line.to_string()))
        })
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let lines = lines.lock().unwrap().clone();
    (result, lines)
}

#[test]
fn each_event_becomes_one_line() {
    let ((), lines) = capture(|| {
        tracing::info!("first");
        tracing::warn!(step = 2, "second");
    });
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("first"));
    assert!(lines[1].contains("WARN"));
    assert!(lines[1].contains("step=2"));
    assert!(!lines[1].ends_with('\n'));
}

#[test]
fn refused_frame_listener_is_reported() {
    let host = Rc::new(HeadlessHost::new(Size::new(1000.0, 800.0)));
    host.add_frame(FrameSpec::new(Size::new(600.0, 400.0)).cross_origin());

    let (active, lines) = capture(|| {
        let mask = ReadingMask::new(host.clone());
        mask.initialize();
        let active = mask.is_active();
        mask.remove_canvas();
        active
    });

    assert!(active);
    assert!(lines
        .iter()
        .any(|line| line.contains("WARN") && line.contains("unable to track frame pointer")));
    assert!(lines.iter().any(|line| line.contains("reading mask enabled")));
}
