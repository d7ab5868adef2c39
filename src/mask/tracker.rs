use crate::mask::frames::FrameRegistry;
use crate::mask::geometry::{frame_offset, Point, Size};
use crate::mask::host::{Host, PointerEvent, PointerHandler};

/// Pointer position in main-document coordinates for an event reported by a
/// frame window.
///
/// Only approximates frames laid out flush with the bottom-right of the main
/// viewport; no bounding box is consulted.
pub fn frame_pointer_position(main_viewport: Size, event: PointerEvent) -> Point {
    event
        .position
        .offset_by(frame_offset(main_viewport, event.view))
}

/// Attaches `handler` to `window` and records it in `registry`.
///
/// Returns `false` when the window is already tracked or the host refuses the
/// listener; refusals are logged and otherwise ignored.
pub fn attach_frame<H: Host>(
    host: &H,
    registry: &mut FrameRegistry<H::Window>,
    window: H::Window,
    handler: PointerHandler,
) -> bool {
    if registry.contains(&window) {
        tracing::debug!(?window, "frame already tracked");
        return false;
    }
    match host.add_frame_pointer_listener(&window, handler) {
        Ok(listener) => {
            tracing::debug!(?window, ?listener, "tracking frame pointer");
            registry.insert(window, listener);
            true
        }
        Err(err) => {
            tracing::warn!(?window, %err, "unable to track frame pointer");
            false
        }
    }
}

/// Removes every frame listener in `registry`, returning how many removals
/// failed. Each failure is logged and does not stop the others.
pub fn detach_frames<H: Host>(host: &H, registry: &mut FrameRegistry<H::Window>) -> usize {
    let mut failures = 0;
    for entry in registry.drain() {
        if let Err(err) = host.remove_frame_pointer_listener(&entry.window, entry.listener) {
            failures += 1;
            tracing::warn!(window = ?entry.window, %err, "unable to detach frame pointer listener");
        }
    }
    failures
}
