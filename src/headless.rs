//! In-memory page implementing [`Host`].
//!
//! Used by the preview binary, the benches and the tests. Events are
//! dispatched synchronously; animation-frame callbacks queue up until
//! [`HeadlessHost::run_animation_frames`] is called.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::mask::geometry::{Point, Rect, Size};
use crate::mask::host::{
    Callback, DocumentView, FrameHandle, Host, HostError, InsertionHandler, ListenerId,
    ObserverId, PointerEvent, PointerHandler, WindowEventKind,
};
use crate::mask::surface::{CompositeMode, MaskSurface, Rgba, RgbaSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameWindow(u64);

/// Which lookup a frame element answers when asked for its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameExposure {
    #[default]
    ContentWindow,
    WindowProperty,
    ContentDocument,
    ContentDocumentParent,
    DocumentProperty,
    /// Every lookup throws.
    Denied,
    /// Every lookup answers nothing.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSpec {
    pub viewport: Size,
    pub exposure: FrameExposure,
    /// Listener registration on the frame window throws.
    pub cross_origin: bool,
}

impl FrameSpec {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            exposure: FrameExposure::default(),
            cross_origin: false,
        }
    }

    pub fn exposure(mut self, exposure: FrameExposure) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn cross_origin(mut self) -> Self {
        self.cross_origin = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessFrame {
    window: FrameWindow,
    exposure: FrameExposure,
}

impl HeadlessFrame {
    pub fn window(&self) -> FrameWindow {
        self.window
    }

    fn answer<T>(
        &self,
        exposure: FrameExposure,
        value: impl FnOnce(FrameWindow) -> T,
    ) -> Result<Option<T>, HostError> {
        match self.exposure {
            FrameExposure::Denied => Err(HostError::AccessDenied(format!("{:?}", self.window))),
            current if current == exposure => Ok(Some(value(self.window))),
            _ => Ok(None),
        }
    }
}

impl FrameHandle for HeadlessFrame {
    type Window = FrameWindow;

    fn content_window(&self) -> Result<Option<FrameWindow>, HostError> {
        self.answer(FrameExposure::ContentWindow, |w| w)
    }

    fn window_property(&self) -> Result<Option<FrameWindow>, HostError> {
        self.answer(FrameExposure::WindowProperty, |w| w)
    }

    fn content_document(&self) -> Result<Option<DocumentView<FrameWindow>>, HostError> {
        if self.exposure == FrameExposure::ContentDocumentParent {
            return Ok(Some(DocumentView {
                default_view: None,
                parent_window: Some(self.window),
            }));
        }
        self.answer(FrameExposure::ContentDocument, |w| DocumentView {
            default_view: Some(w),
            parent_window: None,
        })
    }

    fn document_property(&self) -> Result<Option<DocumentView<FrameWindow>>, HostError> {
        self.answer(FrameExposure::DocumentProperty, |w| DocumentView {
            default_view: Some(w),
            parent_window: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessNode {
    name: String,
    frame: Option<HeadlessFrame>,
}

/// Surface handle shared with the page so the pixels stay inspectable.
#[derive(Debug, Clone)]
pub struct HeadlessSurface(Rc<RefCell<RgbaSurface>>);

impl MaskSurface for HeadlessSurface {
    fn size(&self) -> Size {
        self.0.borrow().size()
    }

    fn resize(&mut self, size: Size) {
        self.0.borrow_mut().resize(size);
    }

    fn move_to(&mut self, offset: Point) {
        self.0.borrow_mut().move_to(offset);
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.0.borrow_mut().clear_rect(rect);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba, alpha: f64, mode: CompositeMode) {
        self.0.borrow_mut().fill_rect(rect, color, alpha, mode);
    }
}

struct WindowSlot {
    viewport: Size,
    cross_origin: bool,
}

#[derive(Default)]
struct PageState {
    viewport: Size,
    scroll: Point,
    next_id: u64,
    frames: Vec<HeadlessFrame>,
    windows: HashMap<FrameWindow, WindowSlot>,
    document_listeners: BTreeMap<ListenerId, PointerHandler>,
    window_listeners: BTreeMap<ListenerId, (WindowEventKind, Callback)>,
    frame_listeners: BTreeMap<ListenerId, (FrameWindow, PointerHandler)>,
    observers: BTreeMap<ObserverId, InsertionHandler<HeadlessNode>>,
    animation_frames: Vec<Box<dyn FnOnce()>>,
    surface: Option<Rc<RefCell<RgbaSurface>>>,
    fail_surface: bool,
    refuse_page_listeners: bool,
    refused_animation_frames: usize,
}

impl PageState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn add_frame(&mut self, spec: FrameSpec) -> HeadlessFrame {
        let window = FrameWindow(self.next_id());
        self.windows.insert(
            window,
            WindowSlot {
                viewport: spec.viewport,
                cross_origin: spec.cross_origin,
            },
        );
        let frame = HeadlessFrame {
            window,
            exposure: spec.exposure,
        };
        self.frames.push(frame.clone());
        frame
    }
}

pub struct HeadlessHost {
    page: RefCell<PageState>,
}

impl HeadlessHost {
    pub fn new(viewport: Size) -> Self {
        Self {
            page: RefCell::new(PageState {
                viewport,
                ..Default::default()
            }),
        }
    }

    /// Adds a frame that is already part of the document; observers are not
    /// notified.
    pub fn add_frame(&self, spec: FrameSpec) -> FrameWindow {
        self.page.borrow_mut().add_frame(spec).window
    }

    /// Inserts a frame and notifies insertion observers.
    pub fn insert_frame(&self, spec: FrameSpec) -> FrameWindow {
        let frame = self.page.borrow_mut().add_frame(spec);
        let window = frame.window;
        self.notify_insertion(vec![HeadlessNode {
            name: "IFRAME".to_string(),
            frame: Some(frame),
        }]);
        window
    }

    /// Inserts a non-frame element and notifies insertion observers.
    pub fn insert_element(&self, name: &str) {
        self.notify_insertion(vec![HeadlessNode {
            name: name.to_ascii_uppercase(),
            frame: None,
        }]);
    }

    /// Makes later listener operations on `window` throw, as if the frame
    /// navigated to another origin.
    pub fn set_cross_origin(&self, window: FrameWindow, cross_origin: bool) {
        if let Some(slot) = self.page.borrow_mut().windows.get_mut(&window) {
            slot.cross_origin = cross_origin;
        }
    }

    pub fn set_surface_failure(&self, fail: bool) {
        self.page.borrow_mut().fail_surface = fail;
    }

    /// Makes document and window listener registration throw.
    pub fn set_page_listener_refusal(&self, refuse: bool) {
        self.page.borrow_mut().refuse_page_listeners = refuse;
    }

    /// The next `count` animation-frame requests fail and drop their callback.
    pub fn refuse_animation_frames(&self, count: usize) {
        self.page.borrow_mut().refused_animation_frames = count;
    }

    pub fn move_pointer(&self, position: Point) {
        let (view, handlers) = {
            let page = self.page.borrow();
            let handlers: Vec<_> = page.document_listeners.values().cloned().collect();
            (page.viewport, handlers)
        };
        for handler in handlers {
            handler(PointerEvent { position, view });
        }
    }

    pub fn move_pointer_in_frame(&self, window: FrameWindow, position: Point) {
        let (view, handlers) = {
            let page = self.page.borrow();
            let Some(slot) = page.windows.get(&window) else {
                return;
            };
            let handlers: Vec<_> = page
                .frame_listeners
                .values()
                .filter(|(target, _)| *target == window)
                .map(|(_, handler)| handler.clone())
                .collect();
            (slot.viewport, handlers)
        };
        for handler in handlers {
            handler(PointerEvent { position, view });
        }
    }

    pub fn resize(&self, viewport: Size) {
        self.page.borrow_mut().viewport = viewport;
        self.dispatch_window_event(WindowEventKind::Resize);
    }

    pub fn scroll_to(&self, offset: Point) {
        self.page.borrow_mut().scroll = offset;
        self.dispatch_window_event(WindowEventKind::Scroll);
    }

    /// Runs every queued animation-frame callback, returning how many ran.
    pub fn run_animation_frames(&self) -> usize {
        let callbacks = std::mem::take(&mut self.page.borrow_mut().animation_frames);
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }

    pub fn pending_animation_frames(&self) -> usize {
        self.page.borrow().animation_frames.len()
    }

    pub fn document_listener_count(&self) -> usize {
        self.page.borrow().document_listeners.len()
    }

    pub fn window_listener_count(&self, kind: WindowEventKind) -> usize {
        self.page
            .borrow()
            .window_listeners
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn frame_listener_count(&self, window: FrameWindow) -> usize {
        self.page
            .borrow()
            .frame_listeners
            .values()
            .filter(|(target, _)| *target == window)
            .count()
    }

    pub fn observer_count(&self) -> usize {
        self.page.borrow().observers.len()
    }

    /// Listeners and observers registered anywhere on the page.
    pub fn registration_count(&self) -> usize {
        let page = self.page.borrow();
        page.document_listeners.len()
            + page.window_listeners.len()
            + page.frame_listeners.len()
            + page.observers.len()
    }

    pub fn has_surface(&self) -> bool {
        self.page.borrow().surface.is_some()
    }

    pub fn surface(&self) -> Option<RgbaSurface> {
        self.page
            .borrow()
            .surface
            .as_ref()
            .map(|surface| surface.borrow().clone())
    }

    fn dispatch_window_event(&self, kind: WindowEventKind) {
        let handlers: Vec<_> = self
            .page
            .borrow()
            .window_listeners
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler();
        }
    }

    fn notify_insertion(&self, nodes: Vec<HeadlessNode>) {
        let observers: Vec<_> = self.page.borrow().observers.values().cloned().collect();
        for observer in observers {
            observer(&nodes);
        }
    }
}

impl Host for HeadlessHost {
    type Window = FrameWindow;
    type Frame = HeadlessFrame;
    type Node = HeadlessNode;
    type Surface = HeadlessSurface;

    fn viewport_size(&self) -> Size {
        self.page.borrow().viewport
    }

    fn scroll_offset(&self) -> Point {
        self.page.borrow().scroll
    }

    fn frame_elements(&self) -> Vec<HeadlessFrame> {
        self.page.borrow().frames.clone()
    }

    fn node_name(&self, node: &HeadlessNode) -> String {
        node.name.clone()
    }

    fn node_as_frame(&self, node: &HeadlessNode) -> Option<HeadlessFrame> {
        node.frame.clone()
    }

    fn create_surface(&self, size: Size, offset: Point) -> Result<HeadlessSurface, HostError> {
        let mut page = self.page.borrow_mut();
        if page.fail_surface {
            return Err(HostError::SurfaceUnavailable("document body missing".into()));
        }
        let surface = Rc::new(RefCell::new(RgbaSurface::new(size, offset)));
        page.surface = Some(surface.clone());
        Ok(HeadlessSurface(surface))
    }

    fn remove_surface(&self, surface: HeadlessSurface) {
        let mut page = self.page.borrow_mut();
        if page
            .surface
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, &surface.0))
        {
            page.surface = None;
        }
    }

    fn add_document_pointer_listener(
        &self,
        handler: PointerHandler,
    ) -> Result<ListenerId, HostError> {
        let mut page = self.page.borrow_mut();
        if page.refuse_page_listeners {
            return Err(HostError::Unsupported("document refused mousemove".into()));
        }
        let id = ListenerId(page.next_id());
        page.document_listeners.insert(id, handler);
        Ok(id)
    }

    fn add_window_listener(
        &self,
        kind: WindowEventKind,
        handler: Callback,
    ) -> Result<ListenerId, HostError> {
        let mut page = self.page.borrow_mut();
        if page.refuse_page_listeners {
            return Err(HostError::Unsupported(format!("window refused {kind:?}")));
        }
        let id = ListenerId(page.next_id());
        page.window_listeners.insert(id, (kind, handler));
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        let mut page = self.page.borrow_mut();
        page.document_listeners.remove(&id);
        page.window_listeners.remove(&id);
    }

    fn add_frame_pointer_listener(
        &self,
        window: &FrameWindow,
        handler: PointerHandler,
    ) -> Result<ListenerId, HostError> {
        let mut page = self.page.borrow_mut();
        match page.windows.get(window) {
            Some(slot) if slot.cross_origin => {
                return Err(HostError::AccessDenied(format!("{window:?}")));
            }
            Some(_) => {}
            None => return Err(HostError::Unsupported(format!("unknown window {window:?}"))),
        }
        let id = ListenerId(page.next_id());
        page.frame_listeners.insert(id, (*window, handler));
        Ok(id)
    }

    fn remove_frame_pointer_listener(
        &self,
        window: &FrameWindow,
        id: ListenerId,
    ) -> Result<(), HostError> {
        let mut page = self.page.borrow_mut();
        if page.windows.get(window).is_some_and(|slot| slot.cross_origin) {
            return Err(HostError::AccessDenied(format!("{window:?}")));
        }
        page.frame_listeners.remove(&id);
        Ok(())
    }

    fn observe_insertions(
        &self,
        handler: InsertionHandler<HeadlessNode>,
    ) -> Result<ObserverId, HostError> {
        let mut page = self.page.borrow_mut();
        let id = ObserverId(page.next_id());
        page.observers.insert(id, handler);
        Ok(id)
    }

    fn disconnect_observer(&self, id: ObserverId) {
        self.page.borrow_mut().observers.remove(&id);
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> Result<(), HostError> {
        let mut page = self.page.borrow_mut();
        if page.refused_animation_frames > 0 {
            page.refused_animation_frames -= 1;
            return Err(HostError::Unsupported("animation frame refused".into()));
        }
        page.animation_frames.push(callback);
        Ok(())
    }
}
