pub mod frames;
pub mod geometry;
pub mod host;
pub mod reading_mask;
pub mod renderer;
pub mod state;
pub mod surface;
pub mod tracker;
pub mod watcher;

pub use geometry::{CanvasState, MaskConfig, MaskUnit, Point, Rect, Size};
pub use host::{FrameHandle, Host, HostError, ListenerId, ObserverId, PointerEvent};
pub use reading_mask::ReadingMask;
pub use surface::{MaskSurface, RgbaSurface};
