use reading_mask::guide::{GuideSettings, PointerGuide};
use reading_mask::mask::Point;

fn running_guide() -> PointerGuide {
    let mut guide = PointerGuide::new(GuideSettings::default());
    guide.start();
    guide
}

#[test]
fn guide_starts_offscreen() {
    let guide = running_guide();
    assert_eq!(guide.mouse(), Point::new(-100.0, -100.0));
    assert_eq!(guide.ring(), Point::new(-100.0, -100.0));
}

#[test]
fn ring_converges_on_the_mouse() {
    let mut guide = running_guide();
    guide.pointer_moved(Point::new(300.0, 200.0), Point::new(0.0, 50.0));
    assert_eq!(guide.mouse(), Point::new(300.0, 250.0));

    let first = guide.step().unwrap();
    assert_eq!(first.dot, Point::new(300.0, 250.0));
    assert!((guide.ring().x + 20.0).abs() < 1e-9);
    assert!((guide.ring().y + 30.0).abs() < 1e-9);

    for _ in 0..200 {
        guide.step();
    }
    assert!((guide.ring().x - 300.0).abs() < 1e-6);
    assert!((guide.ring().y - 250.0).abs() < 1e-6);
}

#[test]
fn ring_shrinks_while_pressed() {
    let mut guide = running_guide();
    let idle = guide.step().unwrap();
    assert_eq!(idle.ring_padding, 15.0);

    guide.set_mouse_down(true);
    let pressed = guide.step().unwrap();
    assert_eq!(pressed.ring_padding, 10.0);
    assert_eq!(pressed.ring.x, guide.ring().x - 10.0);
}

#[test]
fn dot_border_follows_hover() {
    let mut guide = running_guide();
    assert_eq!(guide.step().unwrap().dot_border, "white");
    guide.set_hovering(true);
    let frame = guide.step().unwrap();
    assert_eq!(frame.dot_border, "#750c7e");
    assert_eq!(frame.ring_border, "#750c7e");
}
