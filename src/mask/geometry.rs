pub const DEFAULT_HEIGHT_PERCENTAGE: f64 = 25.0;
pub const DEFAULT_WIDTH_PERCENTAGE: f64 = 100.0;
pub const DEFAULT_ALPHA: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Size of the clear window as a share of the viewport, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskUnit {
    pub height_percentage: f64,
    pub width_percentage: f64,
}

impl Default for MaskUnit {
    fn default() -> Self {
        Self {
            height_percentage: DEFAULT_HEIGHT_PERCENTAGE,
            width_percentage: DEFAULT_WIDTH_PERCENTAGE,
        }
    }
}

/// Values that survive every enable/disable cycle of the mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskConfig {
    pub unit: MaskUnit,
    pub alpha: f64,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            unit: MaskUnit::default(),
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl MaskConfig {
    pub fn new(width_percentage: f64, height_percentage: f64, alpha: f64) -> Self {
        Self {
            unit: MaskUnit {
                height_percentage,
                width_percentage,
            },
            alpha,
        }
    }

    /// Clamps percentages to `[0, 100]` and alpha to `[0, 1]`.
    /// Non-finite values fall back to the defaults.
    pub fn sanitized(self) -> Self {
        let width = sanitize(self.unit.width_percentage, 0.0, 100.0, DEFAULT_WIDTH_PERCENTAGE);
        let height = sanitize(
            self.unit.height_percentage,
            0.0,
            100.0,
            DEFAULT_HEIGHT_PERCENTAGE,
        );
        let alpha = sanitize(self.alpha, 0.0, 1.0, DEFAULT_ALPHA);
        let clean = Self::new(width, height, alpha);
        if clean != self {
            tracing::warn!(requested = ?self, applied = ?clean, "mask configuration out of range");
        }
        clean
    }
}

fn sanitize(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Overlay dimensions plus the clear window size derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasState {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub window_width: f64,
    pub window_height: f64,
}

impl CanvasState {
    pub fn compute(viewport: Size, unit: MaskUnit) -> Self {
        Self {
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            window_width: unit.width_percentage / 100.0 * viewport.width,
            window_height: unit.height_percentage / 100.0 * viewport.height,
        }
    }

    pub fn viewport(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }

    pub fn window(&self) -> Size {
        Size::new(self.window_width, self.window_height)
    }
}

/// Rectangle left transparent around `pointer`.
///
/// The window is centered on the pointer, pushed back inside the leading
/// edge, then pulled back by its overflow past the trailing edge. A window
/// wider (or taller) than the viewport stays pinned at 0 on that axis.
pub fn clear_rect(pointer: Point, state: &CanvasState) -> Rect {
    let x = clamp_axis(pointer.x, state.window_width, state.viewport_width);
    let y = clamp_axis(pointer.y, state.window_height, state.viewport_height);
    Rect::new(x, y, state.window_width, state.window_height)
}

fn clamp_axis(pointer: f64, window: f64, viewport: f64) -> f64 {
    let mut origin = (pointer - window / 2.0).max(0.0);
    let overflow = viewport - (origin + window);
    if overflow < 0.0 {
        origin += overflow;
    }
    origin.max(0.0)
}

/// Approximate position of a frame inside the main viewport, taken as the
/// difference between the two viewport sizes.
pub fn frame_offset(main_viewport: Size, frame_viewport: Size) -> Point {
    Point::new(
        main_viewport.width - frame_viewport.width,
        main_viewport.height - frame_viewport.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(viewport: (f64, f64), window: (f64, f64)) -> CanvasState {
        CanvasState {
            viewport_width: viewport.0,
            viewport_height: viewport.1,
            window_width: window.0,
            window_height: window.1,
        }
    }

    #[test]
    fn clear_rect_is_pulled_back_from_far_edges() {
        let rect = clear_rect(Point::new(950.0, 750.0), &state((1000.0, 800.0), (200.0, 200.0)));
        assert_eq!(rect, Rect::new(800.0, 600.0, 200.0, 200.0));
    }

    #[test]
    fn clear_rect_is_pushed_inside_near_edges() {
        let rect = clear_rect(Point::new(10.0, 20.0), &state((1000.0, 800.0), (200.0, 200.0)));
        assert_eq!(rect, Rect::new(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn clear_rect_centers_on_pointer_away_from_edges() {
        let rect = clear_rect(Point::new(500.0, 400.0), &state((1000.0, 800.0), (200.0, 100.0)));
        assert_eq!(rect, Rect::new(400.0, 350.0, 200.0, 100.0));
    }

    #[test]
    fn full_width_window_never_moves_horizontally() {
        let s = state((1000.0, 800.0), (1000.0, 200.0));
        for x in [0.0, 1.0, 333.0, 999.0, 1000.0] {
            assert_eq!(clear_rect(Point::new(x, 400.0), &s).x, 0.0);
        }
    }

    #[test]
    fn clear_rect_stays_inside_viewport_over_a_grid() {
        let s = state((640.0, 480.0), (160.0, 120.0));
        let mut x = 0.0;
        while x <= 640.0 {
            let mut y = 0.0;
            while y <= 480.0 {
                let r = clear_rect(Point::new(x, y), &s);
                assert!(r.x >= 0.0 && r.y >= 0.0, "{r:?}");
                assert!(r.right() <= 640.0 && r.bottom() <= 480.0, "{r:?}");
                y += 13.0;
            }
            x += 17.0;
        }
    }

    #[test]
    fn oversized_window_is_pinned_at_origin() {
        let rect = clear_rect(Point::new(300.0, 300.0), &state((400.0, 400.0), (600.0, 100.0)));
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 250.0);
    }

    #[test]
    fn canvas_state_follows_percentages() {
        let s = CanvasState::compute(Size::new(500.0, 400.0), MaskUnit::default());
        assert_eq!(s.window(), Size::new(500.0, 100.0));
        assert_eq!(s.viewport(), Size::new(500.0, 400.0));
    }

    #[test]
    fn sanitized_clamps_and_replaces_non_finite_values() {
        let config = MaskConfig::new(140.0, -3.0, f64::NAN).sanitized();
        assert_eq!(config.unit.width_percentage, 100.0);
        assert_eq!(config.unit.height_percentage, 0.0);
        assert_eq!(config.alpha, DEFAULT_ALPHA);
    }

    #[test]
    fn frame_offset_is_viewport_difference() {
        let offset = frame_offset(Size::new(1200.0, 900.0), Size::new(800.0, 600.0));
        assert_eq!(offset, Point::new(400.0, 300.0));
    }
}
