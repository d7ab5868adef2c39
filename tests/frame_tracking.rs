use std::rc::Rc;

use reading_mask::headless::{FrameExposure, FrameSpec, HeadlessHost};
use reading_mask::mask::{Point, ReadingMask, Size};

fn page() -> Rc<HeadlessHost> {
    Rc::new(HeadlessHost::new(Size::new(1000.0, 800.0)))
}

fn frame() -> FrameSpec {
    FrameSpec::new(Size::new(600.0, 400.0))
}

#[test]
fn frames_present_at_initialize_are_tracked() {
    let host = page();
    let a = host.add_frame(frame());
    let b = host.add_frame(frame().exposure(FrameExposure::ContentDocument));
    let mask = ReadingMask::new(host.clone());
    mask.initialize();

    assert_eq!(mask.tracked_frame_count(), 2);
    assert_eq!(host.frame_listener_count(a), 1);
    assert_eq!(host.frame_listener_count(b), 1);
}

#[test]
fn inaccessible_frames_do_not_block_initialize() {
    let host = page();
    let ok = host.add_frame(frame());
    host.add_frame(frame().exposure(FrameExposure::Denied));
    host.add_frame(frame().exposure(FrameExposure::Detached));
    let foreign = host.add_frame(frame().cross_origin());
    let mask = ReadingMask::new(host.clone());
    mask.initialize();

    assert!(mask.is_active());
    assert_eq!(mask.tracked_frame_count(), 1);
    assert_eq!(host.frame_listener_count(ok), 1);
    assert_eq!(host.frame_listener_count(foreign), 0);
    assert_eq!(host.document_listener_count(), 1);
}

#[test]
fn frame_pointer_is_translated_into_page_coordinates() {
    let host = page();
    let window = host.add_frame(frame());
    let mask = ReadingMask::new(host.clone());
    mask.initialize();

    host.move_pointer_in_frame(window, Point::new(100.0, 100.0));
    assert_eq!(mask.last_pointer(), Some(Point::new(500.0, 500.0)));
}

#[test]
fn inserted_frames_are_tracked() {
    let host = page();
    let mask = ReadingMask::new(host.clone());
    mask.initialize();
    assert_eq!(mask.tracked_frame_count(), 0);

    let window = host.insert_frame(frame());
    assert_eq!(mask.tracked_frame_count(), 1);
    assert_eq!(host.frame_listener_count(window), 1);

    host.move_pointer_in_frame(window, Point::new(0.0, 0.0));
    assert_eq!(mask.last_pointer(), Some(Point::new(400.0, 400.0)));
}

#[test]
fn inserted_non_frames_are_ignored() {
    let host = page();
    let mask = ReadingMask::new(host.clone());
    mask.initialize();
    host.insert_element("div");
    host.insert_element("img");
    assert_eq!(mask.tracked_frame_count(), 0);
}

#[test]
fn inserted_inaccessible_frames_are_skipped() {
    let host = page();
    let mask = ReadingMask::new(host.clone());
    mask.initialize();
    host.insert_frame(frame().exposure(FrameExposure::Denied));
    host.insert_frame(frame().cross_origin());
    assert!(mask.is_active());
    assert_eq!(mask.tracked_frame_count(), 0);
}

#[test]
fn insertions_after_remove_are_not_tracked() {
    let host = page();
    let mask = ReadingMask::new(host.clone());
    mask.initialize();
    mask.remove_canvas();
    let window = host.insert_frame(frame());
    assert_eq!(host.frame_listener_count(window), 0);
    assert_eq!(host.observer_count(), 0);
}

#[test]
fn frame_that_turned_cross_origin_does_not_break_removal() {
    let host = page();
    let a = host.add_frame(frame());
    let b = host.add_frame(frame());
    let mask = ReadingMask::new(host.clone());
    mask.initialize();

    host.set_cross_origin(a, true);
    mask.remove_canvas();

    assert!(!mask.is_active());
    assert_eq!(mask.tracked_frame_count(), 0);
    assert_eq!(host.frame_listener_count(b), 0);
    assert_eq!(host.document_listener_count(), 0);
    assert_eq!(host.observer_count(), 0);
}

#[test]
fn reinitialize_does_not_duplicate_frame_listeners() {
    let host = page();
    let window = host.add_frame(frame());
    let mask = ReadingMask::new(host.clone());
    for _ in 0..3 {
        mask.initialize();
        mask.remove_canvas();
    }
    mask.initialize();
    assert_eq!(host.frame_listener_count(window), 1);
}
