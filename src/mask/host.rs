//! Seam between the mask and the page it is injected into.
//!
//! Everything the mask needs from its environment goes through [`Host`]:
//! viewport and scroll geometry, the embedded frames present in the document,
//! listener registration, insertion observation, animation-frame scheduling and
//! creation of the drawing surface. Listener registration hands back an id
//! which is the only thing needed to remove that exact listener later.

use std::fmt;
use std::rc::Rc;

use crate::mask::geometry::{Point, Size};
use crate::mask::surface::MaskSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEventKind {
    Resize,
    Scroll,
}

/// Pointer movement as reported by one window.
///
/// `position` is in the reporting window's coordinates and `view` is that
/// window's viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub view: Size,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Cross-origin or not yet loaded frame.
    AccessDenied(String),
    SurfaceUnavailable(String),
    Unsupported(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::AccessDenied(s) => write!(f, "frame access denied: {s}"),
            HostError::SurfaceUnavailable(s) => write!(f, "drawing surface unavailable: {s}"),
            HostError::Unsupported(s) => write!(f, "unsupported by host: {s}"),
        }
    }
}

impl std::error::Error for HostError {}

pub type PointerHandler = Rc<dyn Fn(PointerEvent)>;
pub type Callback = Rc<dyn Fn()>;
pub type InsertionHandler<N> = Rc<dyn Fn(&[N])>;

/// What a frame's document exposes about the window that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView<W> {
    pub default_view: Option<W>,
    pub parent_window: Option<W>,
}

/// An embedded frame element.
///
/// Each accessor mirrors one way frame objects expose their child window.
/// Any of them may fail for cross-origin or still-loading frames.
pub trait FrameHandle {
    type Window;

    fn content_window(&self) -> Result<Option<Self::Window>, HostError>;
    fn window_property(&self) -> Result<Option<Self::Window>, HostError>;
    fn content_document(&self) -> Result<Option<DocumentView<Self::Window>>, HostError>;
    fn document_property(&self) -> Result<Option<DocumentView<Self::Window>>, HostError>;
}

pub trait Host {
    type Window: Clone + PartialEq + fmt::Debug;
    type Frame: FrameHandle<Window = Self::Window>;
    type Node;
    type Surface: MaskSurface;

    fn viewport_size(&self) -> Size;
    fn scroll_offset(&self) -> Point;

    /// Frame elements present in the document right now.
    fn frame_elements(&self) -> Vec<Self::Frame>;
    fn node_name(&self, node: &Self::Node) -> String;
    fn node_as_frame(&self, node: &Self::Node) -> Option<Self::Frame>;

    fn create_surface(&self, size: Size, offset: Point) -> Result<Self::Surface, HostError>;
    fn remove_surface(&self, surface: Self::Surface);

    fn add_document_pointer_listener(&self, handler: PointerHandler)
        -> Result<ListenerId, HostError>;
    fn add_window_listener(
        &self,
        kind: WindowEventKind,
        handler: Callback,
    ) -> Result<ListenerId, HostError>;
    fn remove_listener(&self, id: ListenerId);

    fn add_frame_pointer_listener(
        &self,
        window: &Self::Window,
        handler: PointerHandler,
    ) -> Result<ListenerId, HostError>;
    fn remove_frame_pointer_listener(
        &self,
        window: &Self::Window,
        id: ListenerId,
    ) -> Result<(), HostError>;

    /// Reports nodes inserted anywhere below the document body.
    fn observe_insertions(
        &self,
        handler: InsertionHandler<Self::Node>,
    ) -> Result<ObserverId, HostError>;
    fn disconnect_observer(&self, id: ObserverId);

    /// Queued callbacks cannot be cancelled. On error the callback is dropped
    /// without running.
    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> Result<(), HostError>;
}
