use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::mask::frames::{discover_frame_windows, resolve_frame_window, FrameRegistry};
use crate::mask::geometry::{CanvasState, MaskConfig, Point};
use crate::mask::host::{
    Callback, Host, InsertionHandler, ListenerId, PointerEvent, PointerHandler, WindowEventKind,
};
use crate::mask::renderer::MaskRenderer;
use crate::mask::state::{can_transition, MaskLifecycle};
use crate::mask::tracker::{attach_frame, detach_frames, frame_pointer_position};
use crate::mask::watcher::{inserted_frames, MutationWatcher};

struct MaskInner<H: Host> {
    lifecycle: MaskLifecycle,
    /// Bumped on every activation change so stale deferred callbacks can be
    /// recognised.
    generation: u64,
    scroll_pending: bool,
    renderer: MaskRenderer<H::Surface>,
    listeners: Vec<ListenerId>,
    watcher: MutationWatcher,
    frames: FrameRegistry<H::Window>,
}

/// Reading mask controller.
///
/// Construct one per page and hand it to whatever toggles the feature. The
/// configuration set through [`ReadingMask::canvas_offset_change`] survives
/// any number of `initialize` / `remove_canvas` cycles; everything else is
/// rebuilt on each activation. No operation here returns an error: host
/// failures are logged and the mask degrades instead.
pub struct ReadingMask<H: Host + 'static> {
    host: Rc<H>,
    inner: Rc<RefCell<MaskInner<H>>>,
}

impl<H: Host + 'static> ReadingMask<H> {
    pub fn new(host: Rc<H>) -> Self {
        Self::with_config(host, MaskConfig::default())
    }

    pub fn with_config(host: Rc<H>, config: MaskConfig) -> Self {
        let inner = MaskInner {
            lifecycle: MaskLifecycle::Uninitialized,
            generation: 0,
            scroll_pending: false,
            renderer: MaskRenderer::new(config.sanitized()),
            listeners: Vec::new(),
            watcher: MutationWatcher::default(),
            frames: FrameRegistry::default(),
        };
        Self {
            host,
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    pub fn is_active(&self) -> bool {
        self.inner.borrow().lifecycle.is_active()
    }

    pub fn config(&self) -> MaskConfig {
        self.inner.borrow().renderer.config()
    }

    pub fn canvas_state(&self) -> CanvasState {
        self.inner.borrow().renderer.state()
    }

    pub fn last_pointer(&self) -> Option<Point> {
        self.inner.borrow().renderer.last_pointer()
    }

    pub fn tracked_frame_count(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    pub fn with_surface<R>(&self, f: impl FnOnce(&H::Surface) -> R) -> Option<R> {
        self.inner.borrow().renderer.surface().map(f)
    }

    /// Creates the overlay, starts tracking the pointer in the document and in
    /// every reachable frame, and paints once around the viewport center.
    pub fn initialize(&self) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        if !can_transition(inner.lifecycle, MaskLifecycle::Active) {
            tracing::warn!(lifecycle = ?inner.lifecycle, "reading mask already active");
            return;
        }

        let host = &*self.host;
        let viewport = host.viewport_size();
        let scroll = host.scroll_offset();
        let surface = match host.create_surface(viewport, scroll) {
            Ok(surface) => surface,
            Err(err) => {
                tracing::error!(%err, "unable to create reading mask surface");
                return;
            }
        };
        inner.renderer.attach(surface, viewport);
        inner.lifecycle = MaskLifecycle::Active;
        inner.generation += 1;
        inner.scroll_pending = false;

        let handle = self.handle();
        let registrations = [
            (
                "document pointer",
                host.add_document_pointer_listener(handle.document_pointer_handler()),
            ),
            (
                "resize",
                host.add_window_listener(WindowEventKind::Resize, handle.resize_handler()),
            ),
            (
                "scroll",
                host.add_window_listener(WindowEventKind::Scroll, handle.scroll_handler()),
            ),
        ];
        for (listener, registration) in registrations {
            match registration {
                Ok(id) => inner.listeners.push(id),
                Err(err) => tracing::warn!(listener, %err, "reading mask listener not attached"),
            }
        }

        for window in discover_frame_windows(host) {
            attach_frame(host, &mut inner.frames, window, handle.frame_pointer_handler());
        }

        if let Err(err) = inner.watcher.start(host, handle.insertion_handler()) {
            tracing::warn!(%err, "frames inserted later will not be tracked");
        }

        inner.renderer.repaint();
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            frames = inner.frames.len(),
            "reading mask enabled"
        );
    }

    /// Removes the overlay and every listener the mask registered. Does
    /// nothing when the mask is not active.
    pub fn remove_canvas(&self) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        if !can_transition(inner.lifecycle, MaskLifecycle::Uninitialized) {
            tracing::debug!("reading mask already removed");
            return;
        }

        let host = &*self.host;
        if let Some(surface) = inner.renderer.detach() {
            host.remove_surface(surface);
        }
        for listener in inner.listeners.drain(..) {
            host.remove_listener(listener);
        }
        inner.watcher.stop(host);
        let failures = detach_frames(host, &mut inner.frames);

        inner.lifecycle = MaskLifecycle::Uninitialized;
        inner.generation += 1;
        inner.scroll_pending = false;
        tracing::info!(failures, "reading mask disabled");
    }

    /// Changes the clear window size and the mask opacity. Takes effect
    /// immediately when active, otherwise on the next `initialize`.
    pub fn canvas_offset_change(&self, width_percentage: f64, height_percentage: f64, alpha: f64) {
        let config = MaskConfig::new(width_percentage, height_percentage, alpha).sanitized();
        let mut inner = self.inner.borrow_mut();
        inner.renderer.set_config(config);
        if inner.lifecycle.is_active() {
            let viewport = self.host.viewport_size();
            let scroll = self.host.scroll_offset();
            inner.renderer.sync_viewport(viewport, scroll);
            inner.renderer.repaint();
        }
    }

    fn handle(&self) -> MaskHandle<H> {
        MaskHandle {
            host: Rc::downgrade(&self.host),
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<H: Host + 'static> Drop for ReadingMask<H> {
    fn drop(&mut self) {
        if self.inner.try_borrow().is_ok_and(|inner| inner.lifecycle.is_active()) {
            self.remove_canvas();
        }
    }
}

/// Weak view of the controller captured by every listener, so the host never
/// keeps the mask alive.
struct MaskHandle<H: Host> {
    host: Weak<H>,
    inner: Weak<RefCell<MaskInner<H>>>,
}

impl<H: Host> Clone for MaskHandle<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<H: Host + 'static> MaskHandle<H> {
    fn upgrade(&self) -> Option<(Rc<H>, Rc<RefCell<MaskInner<H>>>)> {
        Some((self.host.upgrade()?, self.inner.upgrade()?))
    }

    /// Runs `f` against the active controller state. Skipped when the mask was
    /// dropped, deactivated, or is busy with another operation.
    fn with_active(&self, f: impl FnOnce(&H, &mut MaskInner<H>)) {
        let Some((host, inner)) = self.upgrade() else {
            return;
        };
        let Ok(mut inner) = inner.try_borrow_mut() else {
            tracing::debug!("reading mask busy; event dropped");
            return;
        };
        if inner.lifecycle.is_active() {
            f(&host, &mut *inner);
        }
    }

    fn document_pointer_handler(&self) -> PointerHandler {
        let handle = self.clone();
        Rc::new(move |event: PointerEvent| {
            handle.with_active(|_, inner| {
                inner.renderer.paint_at(event.position);
            });
        })
    }

    fn frame_pointer_handler(&self) -> PointerHandler {
        let handle = self.clone();
        Rc::new(move |event: PointerEvent| {
            handle.with_active(|host, inner| {
                let point = frame_pointer_position(host.viewport_size(), event);
                inner.renderer.paint_at(point);
            });
        })
    }

    fn resize_handler(&self) -> Callback {
        let handle = self.clone();
        Rc::new(move || {
            handle.with_active(|host, inner| {
                inner
                    .renderer
                    .sync_viewport(host.viewport_size(), host.scroll_offset());
                inner.renderer.repaint();
            });
        })
    }

    fn scroll_handler(&self) -> Callback {
        let handle = self.clone();
        Rc::new(move || {
            let mut scheduled = None;
            handle.with_active(|_, inner| {
                if !inner.scroll_pending {
                    inner.scroll_pending = true;
                    scheduled = Some(inner.generation);
                }
            });
            let (Some(generation), Some(host)) = (scheduled, handle.host.upgrade()) else {
                return;
            };
            let deferred = handle.clone();
            let scheduled =
                host.request_animation_frame(Box::new(move || deferred.scroll_frame(generation)));
            if let Err(err) = scheduled {
                tracing::warn!(%err, "scroll sync frame not scheduled; syncing now");
                handle.scroll_frame(generation);
            }
        })
    }

    fn scroll_frame(&self, generation: u64) {
        self.with_active(|host, inner| {
            if inner.generation != generation {
                return;
            }
            inner.scroll_pending = false;
            inner.renderer.reposition(host.scroll_offset());
            inner.renderer.repaint();
        });
    }

    fn insertion_handler(&self) -> InsertionHandler<H::Node> {
        let handle = self.clone();
        Rc::new(move |nodes: &[H::Node]| {
            handle.with_active(|host, inner| {
                for frame in inserted_frames(host, nodes) {
                    let Some(window) = resolve_frame_window(&frame) else {
                        tracing::debug!("inserted frame has no reachable window");
                        continue;
                    };
                    attach_frame(host, &mut inner.frames, window, handle.frame_pointer_handler());
                }
            });
        })
    }
}
