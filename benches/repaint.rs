use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reading_mask::headless::{FrameSpec, HeadlessHost};
use reading_mask::mask::{Point, ReadingMask, Size};

fn bench_pointer_repaint(c: &mut Criterion) {
    let host = Rc::new(HeadlessHost::new(Size::new(1280.0, 720.0)));
    let mask = ReadingMask::new(host.clone());
    mask.initialize();

    let mut x = 0.0;
    c.bench_function("pointer_repaint_720p", |b| {
        b.iter(|| {
            x = (x + 37.0) % 1280.0;
            host.move_pointer(black_box(Point::new(x, 360.0)));
        })
    });
}

fn bench_lifecycle(c: &mut Criterion) {
    let host = Rc::new(HeadlessHost::new(Size::new(1280.0, 720.0)));
    for _ in 0..8 {
        host.add_frame(FrameSpec::new(Size::new(640.0, 360.0)));
    }
    let mask = ReadingMask::new(host.clone());

    c.bench_function("initialize_remove_8_frames", |b| {
        b.iter(|| {
            mask.initialize();
            mask.remove_canvas();
        })
    });
}

criterion_group!(benches, bench_pointer_repaint, bench_lifecycle);
criterion_main!(benches);
