use crate::mask::host::{DocumentView, FrameHandle, Host, HostError, ListenerId};

/// Resolves the window owned by `frame`, or `None` when it cannot be reached.
///
/// Tries, in order: the content window, the window property, then the default
/// view or parent window of the content document (or document property).
pub fn resolve_frame_window<F: FrameHandle>(frame: &F) -> Option<F::Window> {
    if let Some(window) = attempt("content_window", frame.content_window()) {
        return Some(window);
    }
    if let Some(window) = attempt("window", frame.window_property()) {
        return Some(window);
    }

    let document = attempt("content_document", frame.content_document())
        .or_else(|| attempt("document", frame.document_property()))?;
    let DocumentView {
        default_view,
        parent_window,
    } = document;
    let window = default_view.or(parent_window);
    if window.is_none() {
        tracing::debug!("frame document exposes no window");
    }
    window
}

fn attempt<T>(step: &str, result: Result<Option<T>, HostError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(step, %err, "frame window lookup failed");
            None
        }
    }
}

/// Snapshot of the frames currently in the document with their windows.
/// Frames whose window cannot be reached are dropped.
pub fn discover_frame_windows<H: Host>(host: &H) -> Vec<H::Window> {
    let elements = host.frame_elements();
    let total = elements.len();
    let windows: Vec<_> = elements.iter().filter_map(resolve_frame_window).collect();
    if windows.len() < total {
        tracing::debug!(
            total,
            reachable = windows.len(),
            "some frames have no reachable window"
        );
    }
    windows
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFrame<W> {
    pub window: W,
    pub listener: ListenerId,
}

/// Frame windows carrying a pointer listener during the current activation.
#[derive(Debug)]
pub struct FrameRegistry<W> {
    entries: Vec<TrackedFrame<W>>,
}

impl<W> Default for FrameRegistry<W> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<W: PartialEq> FrameRegistry<W> {
    pub fn contains(&self, window: &W) -> bool {
        self.entries.iter().any(|entry| &entry.window == window)
    }

    pub fn insert(&mut self, window: W, listener: ListenerId) {
        self.entries.push(TrackedFrame { window, listener });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) -> Vec<TrackedFrame<W>> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubFrame {
        content_window: Option<Result<Option<u32>, HostError>>,
        window: Option<u32>,
        content_document: Option<DocumentView<u32>>,
        document: Option<DocumentView<u32>>,
    }

    impl FrameHandle for StubFrame {
        type Window = u32;

        fn content_window(&self) -> Result<Option<u32>, HostError> {
            self.content_window.clone().unwrap_or(Ok(None))
        }

        fn window_property(&self) -> Result<Option<u32>, HostError> {
            Ok(self.window)
        }

        fn content_document(&self) -> Result<Option<DocumentView<u32>>, HostError> {
            Ok(self.content_document.clone())
        }

        fn document_property(&self) -> Result<Option<DocumentView<u32>>, HostError> {
            Ok(self.document.clone())
        }
    }

    #[test]
    fn content_window_wins() {
        let frame = StubFrame {
            content_window: Some(Ok(Some(1))),
            window: Some(2),
            ..Default::default()
        };
        assert_eq!(resolve_frame_window(&frame), Some(1));
    }

    #[test]
    fn denied_content_window_falls_through_to_window_property() {
        let frame = StubFrame {
            content_window: Some(Err(HostError::AccessDenied("cross-origin".into()))),
            window: Some(2),
            ..Default::default()
        };
        assert_eq!(resolve_frame_window(&frame), Some(2));
    }

    #[test]
    fn document_default_view_then_parent_window() {
        let frame = StubFrame {
            content_document: Some(DocumentView {
                default_view: None,
                parent_window: Some(7),
            }),
            ..Default::default()
        };
        assert_eq!(resolve_frame_window(&frame), Some(7));

        let frame = StubFrame {
            document: Some(DocumentView {
                default_view: Some(8),
                parent_window: Some(9),
            }),
            ..Default::default()
        };
        assert_eq!(resolve_frame_window(&frame), Some(8));
    }

    #[test]
    fn nothing_exposed_is_unavailable() {
        assert_eq!(resolve_frame_window(&StubFrame::default()), None);
    }

    #[test]
    fn registry_tracks_and_drains() {
        let mut registry = FrameRegistry::default();
        registry.insert(3u32, ListenerId(1));
        assert!(registry.contains(&3));
        assert!(!registry.contains(&4));
        let drained = registry.drain();
        assert_eq!(drained.len(), 1);
        assert!(registry.is_empty());
    }
}
