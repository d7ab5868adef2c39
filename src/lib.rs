pub mod guide;
pub mod headless;
pub mod logging;
pub mod mask;
pub mod settings;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub mod web;

pub use mask::{MaskConfig, ReadingMask};
