use serde::{Deserialize, Serialize};

use crate::mask::geometry::Point;

/// Share of the remaining distance the ring covers each frame.
pub const RING_EASING: f64 = 0.2;
const OFFSCREEN: Point = Point::new(-100.0, -100.0);
const IDLE_DOT_BORDER: &str = "white";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideSettings {
    #[serde(default = "default_pointer_color")]
    pub pointer_color: String,
    #[serde(default = "default_ring_size")]
    pub ring_size: f64,
    /// Ring padding while the button is held; `ring_size - 5` when unset.
    #[serde(default)]
    pub ring_click_size: Option<f64>,
}

fn default_pointer_color() -> String {
    "#750c7e".into()
}

fn default_ring_size() -> f64 {
    15.0
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            pointer_color: default_pointer_color(),
            ring_size: default_ring_size(),
            ring_click_size: None,
        }
    }
}

impl GuideSettings {
    pub fn ring_click_size(&self) -> f64 {
        self.ring_click_size.unwrap_or(self.ring_size - 5.0)
    }
}

/// Styles to apply to the dot and ring elements for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideFrame {
    pub dot: Point,
    pub dot_border: String,
    pub ring: Point,
    pub ring_padding: f64,
    pub ring_border: String,
}

/// Mouse-following dot with a ring that trails behind it.
#[derive(Debug, Clone)]
pub struct PointerGuide {
    settings: GuideSettings,
    mouse: Point,
    ring: Point,
    mouse_down: bool,
    hovering: bool,
    running: bool,
}

impl PointerGuide {
    pub fn new(settings: GuideSettings) -> Self {
        Self {
            settings,
            mouse: OFFSCREEN,
            ring: OFFSCREEN,
            mouse_down: false,
            hovering: false,
            running: false,
        }
    }

    pub fn settings(&self) -> &GuideSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// `client` is viewport-relative; `page_offset` is the current scroll.
    pub fn pointer_moved(&mut self, client: Point, page_offset: Point) {
        self.mouse = client.offset_by(page_offset);
    }

    pub fn set_mouse_down(&mut self, down: bool) {
        self.mouse_down = down;
    }

    /// Whether the pointer is over an actionable element.
    pub fn set_hovering(&mut self, hovering: bool) {
        self.hovering = hovering;
    }

    pub fn mouse(&self) -> Point {
        self.mouse
    }

    pub fn ring(&self) -> Point {
        self.ring
    }

    /// Advances the ring one frame. Returns `None` once stopped, which is the
    /// signal not to schedule another frame.
    pub fn step(&mut self) -> Option<GuideFrame> {
        if !self.running {
            return None;
        }
        self.ring = Point::new(
            trace(self.ring.x, self.mouse.x, RING_EASING),
            trace(self.ring.y, self.mouse.y, RING_EASING),
        );

        let padding = if self.mouse_down {
            self.settings.ring_click_size()
        } else {
            self.settings.ring_size
        };
        let dot_border = if self.hovering {
            self.settings.pointer_color.clone()
        } else {
            IDLE_DOT_BORDER.to_string()
        };

        Some(GuideFrame {
            dot: self.mouse,
            dot_border,
            ring: Point::new(self.ring.x - padding, self.ring.y - padding),
            ring_padding: padding,
            ring_border: self.settings.pointer_color.clone(),
        })
    }
}

/// Linear interpolation from `from` toward `to` by `amount`.
pub fn trace(from: f64, to: f64, amount: f64) -> f64 {
    (1.0 - amount) * from + amount * to
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_interpolates() {
        assert_eq!(trace(0.0, 10.0, 0.2), 2.0);
        assert_eq!(trace(10.0, 10.0, 0.2), 10.0);
    }

    #[test]
    fn stopped_guide_produces_no_frames() {
        let mut guide = PointerGuide::new(GuideSettings::default());
        assert_eq!(guide.step(), None);
        guide.start();
        assert!(guide.step().is_some());
        guide.stop();
        assert_eq!(guide.step(), None);
    }

    #[test]
    fn click_size_defaults_to_five_less_than_ring() {
        let settings = GuideSettings {
            ring_size: 20.0,
            ..Default::default()
        };
        assert_eq!(settings.ring_click_size(), 15.0);
    }
}
