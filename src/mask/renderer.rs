use crate::mask::geometry::{clear_rect, CanvasState, MaskConfig, Point, Rect, Size};
use crate::mask::surface::{CompositeMode, MaskSurface, Rgba};

const MASK_COLOR: Rgba = Rgba::BLACK;

/// Owns the overlay surface and paints the mask on it.
///
/// Every paint starts from a cleared surface, so the order in which pointer,
/// resize and scroll updates arrive never matters. Without a surface all
/// painting is skipped.
#[derive(Debug)]
pub struct MaskRenderer<S> {
    surface: Option<S>,
    config: MaskConfig,
    state: CanvasState,
    last_pointer: Option<Point>,
}

impl<S: MaskSurface> MaskRenderer<S> {
    pub fn new(config: MaskConfig) -> Self {
        Self {
            surface: None,
            config,
            state: CanvasState::default(),
            last_pointer: None,
        }
    }

    pub fn config(&self) -> MaskConfig {
        self.config
    }

    pub fn set_config(&mut self, config: MaskConfig) {
        self.config = config;
    }

    pub fn state(&self) -> CanvasState {
        self.state
    }

    pub fn last_pointer(&self) -> Option<Point> {
        self.last_pointer
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn attach(&mut self, surface: S, viewport: Size) {
        self.state = CanvasState::compute(viewport, self.config.unit);
        self.surface = Some(surface);
    }

    /// Takes the surface out and forgets the pointer.
    pub fn detach(&mut self) -> Option<S> {
        self.last_pointer = None;
        self.surface.take()
    }

    /// Recomputes the canvas state for `viewport` and resizes and moves the
    /// surface to match.
    pub fn sync_viewport(&mut self, viewport: Size, scroll: Point) {
        self.state = CanvasState::compute(viewport, self.config.unit);
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(viewport);
            surface.move_to(scroll);
        }
    }

    pub fn reposition(&mut self, scroll: Point) {
        if let Some(surface) = self.surface.as_mut() {
            surface.move_to(scroll);
        }
    }

    /// Records `pointer` as the last known position and paints around it.
    pub fn paint_at(&mut self, pointer: Point) -> Option<Rect> {
        self.last_pointer = Some(pointer);
        self.paint(pointer)
    }

    /// Paints around the last known pointer, or the viewport center when no
    /// pointer event arrived yet.
    pub fn repaint(&mut self) -> Option<Rect> {
        let pointer = self
            .last_pointer
            .unwrap_or_else(|| self.state.viewport().center());
        self.paint(pointer)
    }

    fn paint(&mut self, pointer: Point) -> Option<Rect> {
        let surface = self.surface.as_mut()?;
        let full = Rect::from_size(self.state.viewport());
        surface.clear_rect(full);
        surface.fill_rect(full, MASK_COLOR, self.config.alpha, CompositeMode::Xor);
        let window = clear_rect(pointer, &self.state);
        surface.clear_rect(window);
        Some(window)
    }
}
