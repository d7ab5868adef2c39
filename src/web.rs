//! Browser host backed by `web-sys`.
//!
//! Every JavaScript closure handed to the page is kept in a table keyed by the
//! id returned to the mask, so removal always passes the exact function that
//! was registered.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Array, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Event, EventTarget, HtmlCanvasElement, HtmlElement,
    HtmlIFrameElement, MouseEvent, MutationObserver, MutationObserverInit, MutationRecord, Node,
    Window,
};

use crate::guide::{GuideFrame, GuideSettings, PointerGuide};
use crate::mask::geometry::{Point, Rect, Size};
use crate::mask::host::{
    Callback, DocumentView, FrameHandle, Host, HostError, InsertionHandler, ListenerId,
    ObserverId, PointerEvent, PointerHandler, WindowEventKind,
};
use crate::mask::surface::{CompositeMode, MaskSurface, Rgba};
use crate::mask::{MaskConfig, ReadingMask};
use crate::settings::MaskSettings;

const CANVAS_ID: &str = "readingMaskCanvas";
const CANVAS_Z_INDEX: &str = "10000";

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn window_viewport(window: &Window) -> Size {
    let dim = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Size::new(dim(window.inner_width()), dim(window.inner_height()))
}

fn window_scroll(window: &Window) -> Point {
    Point::new(
        window.scroll_x().unwrap_or(0.0),
        window.scroll_y().unwrap_or(0.0),
    )
}

fn window_from(value: JsValue) -> Option<Window> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    value.dyn_into::<Window>().ok()
}

fn document_view(document: JsValue) -> Result<Option<DocumentView<Window>>, HostError> {
    if document.is_undefined() || document.is_null() {
        return Ok(None);
    }
    let default_view = Reflect::get(&document, &JsValue::from_str("defaultView"))
        .map_err(|e| HostError::AccessDenied(describe(&e)))?;
    let parent_window = Reflect::get(&document, &JsValue::from_str("parentWindow"))
        .map_err(|e| HostError::AccessDenied(describe(&e)))?;
    Ok(Some(DocumentView {
        default_view: window_from(default_view),
        parent_window: window_from(parent_window),
    }))
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebFrame(HtmlIFrameElement);

impl WebFrame {
    fn property(&self, name: &str) -> Result<JsValue, HostError> {
        Reflect::get(&self.0, &JsValue::from_str(name))
            .map_err(|e| HostError::AccessDenied(describe(&e)))
    }
}

impl FrameHandle for WebFrame {
    type Window = Window;

    fn content_window(&self) -> Result<Option<Window>, HostError> {
        Ok(self.0.content_window())
    }

    fn window_property(&self) -> Result<Option<Window>, HostError> {
        Ok(window_from(self.property("window")?))
    }

    fn content_document(&self) -> Result<Option<DocumentView<Window>>, HostError> {
        document_view(self.property("contentDocument")?)
    }

    fn document_property(&self) -> Result<Option<DocumentView<Window>>, HostError> {
        document_view(self.property("document")?)
    }
}

/// `<canvas>` overlay laid over the page.
pub struct WebSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl WebSurface {
    fn create(document: &Document, size: Size, offset: Point) -> Result<Self, JsValue> {
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        canvas.set_id(CANVAS_ID);
        let style = canvas.style();
        style.set_property("z-index", CANVAS_Z_INDEX)?;
        style.set_property("position", "absolute")?;
        style.set_property("pointer-events", "none")?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mut surface = Self { canvas, context };
        surface.resize(size);
        surface.move_to(offset);
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&surface.canvas)?;
        Ok(surface)
    }
}

impl MaskSurface for WebSurface {
    fn size(&self) -> Size {
        Size::new(self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn resize(&mut self, size: Size) {
        self.canvas.set_width(size.width.max(0.0).round() as u32);
        self.canvas.set_height(size.height.max(0.0).round() as u32);
    }

    fn move_to(&mut self, offset: Point) {
        let style = self.canvas.style();
        let _ = style.set_property("top", &format!("{}px", offset.y));
        let _ = style.set_property("left", &format!("{}px", offset.x));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.context
            .clear_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba, alpha: f64, mode: CompositeMode) {
        let operation = match mode {
            CompositeMode::SourceOver => "source-over",
            CompositeMode::Xor => "xor",
        };
        self.context.set_global_alpha(alpha);
        let _ = self.context.set_global_composite_operation(operation);
        self.context.set_fill_style_str(&format!(
            "rgba({}, {}, {}, {})",
            color.r,
            color.g,
            color.b,
            color.a as f64 / 255.0
        ));
        self.context
            .fill_rect(rect.x, rect.y, rect.width, rect.height);
    }
}

struct Registration {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

struct Observation {
    observer: MutationObserver,
    _closure: Closure<dyn FnMut(Array, MutationObserver)>,
}

pub struct WebHost {
    window: Window,
    document: Document,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<ListenerId, Registration>>,
    observers: RefCell<HashMap<ObserverId, Observation>>,
}

impl WebHost {
    pub fn from_global() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        Ok(Self {
            window,
            document,
            next_id: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
            observers: RefCell::new(HashMap::new()),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn listen(
        &self,
        target: EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    ) -> Result<ListenerId, JsValue> {
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        let id = ListenerId(self.next_id());
        self.listeners.borrow_mut().insert(
            id,
            Registration {
                target,
                event,
                closure,
            },
        );
        Ok(id)
    }

    fn unlisten(&self, id: ListenerId) -> Result<(), JsValue> {
        let Some(registration) = self.listeners.borrow_mut().remove(&id) else {
            return Ok(());
        };
        registration.target.remove_event_listener_with_callback(
            registration.event,
            registration.closure.as_ref().unchecked_ref(),
        )
    }

    fn pointer_closure(
        fallback_view: Window,
        handler: PointerHandler,
    ) -> Closure<dyn FnMut(Event)> {
        Closure::new(move |event: Event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let view = mouse
                .view()
                .map(|view| window_viewport(&view))
                .unwrap_or_else(|| window_viewport(&fallback_view));
            handler(PointerEvent {
                position: Point::new(mouse.client_x() as f64, mouse.client_y() as f64),
                view,
            });
        })
    }
}

impl Host for WebHost {
    type Window = Window;
    type Frame = WebFrame;
    type Node = Node;
    type Surface = WebSurface;

    fn viewport_size(&self) -> Size {
        window_viewport(&self.window)
    }

    fn scroll_offset(&self) -> Point {
        window_scroll(&self.window)
    }

    fn frame_elements(&self) -> Vec<WebFrame> {
        let collection = self.document.get_elements_by_tag_name("iframe");
        (0..collection.length())
            .filter_map(|i| collection.item(i))
            .filter_map(|element| element.dyn_into::<HtmlIFrameElement>().ok())
            .map(WebFrame)
            .collect()
    }

    fn node_name(&self, node: &Node) -> String {
        node.node_name()
    }

    fn node_as_frame(&self, node: &Node) -> Option<WebFrame> {
        node.dyn_ref::<HtmlIFrameElement>().cloned().map(WebFrame)
    }

    fn create_surface(&self, size: Size, offset: Point) -> Result<WebSurface, HostError> {
        WebSurface::create(&self.document, size, offset)
            .map_err(|e| HostError::SurfaceUnavailable(describe(&e)))
    }

    fn remove_surface(&self, surface: WebSurface) {
        surface.canvas.remove();
    }

    fn add_document_pointer_listener(
        &self,
        handler: PointerHandler,
    ) -> Result<ListenerId, HostError> {
        let closure = Self::pointer_closure(self.window.clone(), handler);
        self.listen(self.document.clone().into(), "mousemove", closure)
            .map_err(|e| HostError::Unsupported(describe(&e)))
    }

    fn add_window_listener(
        &self,
        kind: WindowEventKind,
        handler: Callback,
    ) -> Result<ListenerId, HostError> {
        let event = match kind {
            WindowEventKind::Resize => "resize",
            WindowEventKind::Scroll => "scroll",
        };
        let closure = Closure::new(move |_: Event| handler());
        self.listen(self.window.clone().into(), event, closure)
            .map_err(|e| HostError::Unsupported(describe(&e)))
    }

    fn remove_listener(&self, id: ListenerId) {
        if let Err(err) = self.unlisten(id) {
            tracing::warn!(?id, err = %describe(&err), "listener removal failed");
        }
    }

    fn add_frame_pointer_listener(
        &self,
        window: &Window,
        handler: PointerHandler,
    ) -> Result<ListenerId, HostError> {
        let closure = Self::pointer_closure(window.clone(), handler);
        self.listen(window.clone().into(), "mousemove", closure)
            .map_err(|e| HostError::AccessDenied(describe(&e)))
    }

    fn remove_frame_pointer_listener(&self, _window: &Window, id: ListenerId) -> Result<(), HostError> {
        self.unlisten(id)
            .map_err(|e| HostError::AccessDenied(describe(&e)))
    }

    fn observe_insertions(&self, handler: InsertionHandler<Node>) -> Result<ObserverId, HostError> {
        let body = self
            .document
            .body()
            .ok_or_else(|| HostError::Unsupported("document has no body".into()))?;
        let closure = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                let mut nodes = Vec::new();
                for record in records.iter() {
                    let Ok(record) = record.dyn_into::<MutationRecord>() else {
                        continue;
                    };
                    if record.type_() != "childList" {
                        continue;
                    }
                    let added = record.added_nodes();
                    nodes.extend((0..added.length()).filter_map(|i| added.item(i)));
                }
                if !nodes.is_empty() {
                    handler(&nodes);
                }
            },
        );
        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|e| HostError::Unsupported(describe(&e)))?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(&body, &init)
            .map_err(|e| HostError::Unsupported(describe(&e)))?;

        let id = ObserverId(self.next_id());
        self.observers.borrow_mut().insert(
            id,
            Observation {
                observer,
                _closure: closure,
            },
        );
        Ok(id)
    }

    fn disconnect_observer(&self, id: ObserverId) {
        if let Some(observation) = self.observers.borrow_mut().remove(&id) {
            observation.observer.disconnect();
        }
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> Result<(), HostError> {
        let function = Closure::once_into_js(callback);
        self.window
            .request_animation_frame(function.unchecked_ref())
            .map(|_| ())
            .map_err(|e| HostError::Unsupported(describe(&e)))
    }
}

/// Reading mask bound to the page's global window.
#[wasm_bindgen]
pub struct WebReadingMask {
    mask: ReadingMask<WebHost>,
}

#[wasm_bindgen]
impl WebReadingMask {
    #[wasm_bindgen(constructor)]
    pub fn new(width_percentage: f64, height_percentage: f64, alpha: f64) -> Result<WebReadingMask, JsValue> {
        crate::logging::init_console(false);
        let host = Rc::new(WebHost::from_global()?);
        let config = MaskConfig::new(width_percentage, height_percentage, alpha);
        Ok(Self {
            mask: ReadingMask::with_config(host, config),
        })
    }

    /// Builds a mask from a settings JSON document and shows it right away
    /// when the settings enable it.
    #[wasm_bindgen(js_name = fromSettings)]
    pub fn from_settings(settings_json: &str) -> Result<WebReadingMask, JsValue> {
        let settings: MaskSettings = serde_json::from_str(settings_json)
            .map_err(|e| JsValue::from_str(&format!("invalid settings: {e}")))?;
        crate::logging::init_console(settings.debug_logging);
        let host = Rc::new(WebHost::from_global()?);
        let mask = ReadingMask::new(host);
        settings.apply(&mask);
        Ok(Self { mask })
    }

    pub fn initialize(&self) {
        self.mask.initialize();
    }

    #[wasm_bindgen(js_name = removeCanvas)]
    pub fn remove_canvas(&self) {
        self.mask.remove_canvas();
    }

    #[wasm_bindgen(js_name = canvasOffsetChange)]
    pub fn canvas_offset_change(&self, width: f64, height: f64, alpha: f64) {
        self.mask.canvas_offset_change(width, height, alpha);
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.mask.is_active()
    }
}

const HOVER_SELECTOR: &str = ".p-action-click:hover";

struct GuideRuntime {
    host: WebHost,
    guide: RefCell<PointerGuide>,
    dot: HtmlElement,
    ring: HtmlElement,
    listeners: RefCell<Vec<ListenerId>>,
}

impl GuideRuntime {
    fn apply(&self, frame: &GuideFrame) {
        let dot = self.dot.style();
        let _ = dot.set_property("border-color", &frame.dot_border);
        let _ = dot.set_property(
            "transform",
            &format!("translate({}px, {}px)", frame.dot.x, frame.dot.y),
        );
        let ring = self.ring.style();
        let _ = ring.set_property("border-color", &frame.ring_border);
        let _ = ring.set_property("padding", &format!("{}px", frame.ring_padding));
        let _ = ring.set_property(
            "transform",
            &format!("translate({}px, {}px)", frame.ring.x, frame.ring.y),
        );
    }

    fn schedule(self: Rc<Self>) {
        let runtime = self.clone();
        let scheduled = self.host.request_animation_frame(Box::new(move || {
            let hovering = runtime
                .host
                .document()
                .query_selector(HOVER_SELECTOR)
                .ok()
                .flatten()
                .is_some();
            let frame = {
                let mut guide = runtime.guide.borrow_mut();
                guide.set_hovering(hovering);
                guide.step()
            };
            if let Some(frame) = frame {
                runtime.apply(&frame);
                runtime.schedule();
            }
        }));
        if let Err(err) = scheduled {
            tracing::warn!(%err, "pointer guide stopped");
            self.guide.borrow_mut().stop();
        }
    }
}

/// Dot and eased ring following the mouse.
#[wasm_bindgen]
pub struct WebPointerGuide {
    runtime: Option<Rc<GuideRuntime>>,
    settings: GuideSettings,
}

#[wasm_bindgen]
impl WebPointerGuide {
    #[wasm_bindgen(constructor)]
    pub fn new(pointer_color: Option<String>, ring_size: Option<f64>, ring_click_size: Option<f64>) -> WebPointerGuide {
        let mut settings = GuideSettings::default();
        if let Some(color) = pointer_color {
            settings.pointer_color = color;
        }
        if let Some(size) = ring_size {
            settings.ring_size = size;
        }
        settings.ring_click_size = ring_click_size;
        Self {
            runtime: None,
            settings,
        }
    }

    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.runtime.is_some() {
            return Ok(());
        }
        crate::logging::init_console(false);
        let host = WebHost::from_global()?;
        let body = host
            .document()
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        let dot = host.document().create_element("div")?.dyn_into::<HtmlElement>()?;
        dot.set_id("pointer-dot");
        let ring = host.document().create_element("div")?.dyn_into::<HtmlElement>()?;
        ring.set_id("pointer-ring");
        body.insert_before(&dot, body.first_child().as_ref())?;
        body.insert_before(&ring, body.first_child().as_ref())?;

        let mut guide = PointerGuide::new(self.settings.clone());
        guide.start();
        let runtime = Rc::new(GuideRuntime {
            host,
            guide: RefCell::new(guide),
            dot,
            ring,
            listeners: RefCell::new(Vec::new()),
        });

        let weak = Rc::downgrade(&runtime);
        let on_move = Closure::new(move |event: Event| {
            let (Some(runtime), Some(mouse)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>()) else {
                return;
            };
            let client = Point::new(mouse.client_x() as f64, mouse.client_y() as f64);
            let offset = window_scroll(runtime.host.window());
            runtime.guide.borrow_mut().pointer_moved(client, offset);
        });
        let move_id = runtime
            .host
            .listen(runtime.host.document().clone().into(), "mousemove", on_move)?;
        runtime.listeners.borrow_mut().push(move_id);

        for (event, down) in [("mousedown", true), ("mouseup", false)] {
            let weak = Rc::downgrade(&runtime);
            let closure = Closure::new(move |_: Event| {
                if let Some(runtime) = weak.upgrade() {
                    runtime.guide.borrow_mut().set_mouse_down(down);
                }
            });
            let id = runtime
                .host
                .listen(runtime.host.window().clone().into(), event, closure)?;
            runtime.listeners.borrow_mut().push(id);
        }

        runtime.clone().schedule();
        self.runtime = Some(runtime);
        Ok(())
    }

    pub fn stop(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        runtime.guide.borrow_mut().stop();
        for id in runtime.listeners.borrow_mut().drain(..) {
            runtime.host.remove_listener(id);
        }
        runtime.dot.remove();
        runtime.ring.remove();
    }
}
