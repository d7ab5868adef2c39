use serde::{Deserialize, Serialize};

use crate::guide::GuideSettings;
use crate::mask::geometry::{
    MaskConfig, DEFAULT_ALPHA, DEFAULT_HEIGHT_PERCENTAGE, DEFAULT_WIDTH_PERCENTAGE,
};
use crate::mask::{Host, ReadingMask};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MaskSettings {
    /// Width of the clear window as a percentage of the viewport width.
    #[serde(default = "default_width_percentage")]
    pub width_percentage: f64,
    /// Height of the clear window as a percentage of the viewport height.
    #[serde(default = "default_height_percentage")]
    pub height_percentage: f64,
    /// Opacity of the darkened area, `0.0..=1.0`.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Whether the mask should be shown when the page loads.
    #[serde(default)]
    pub enabled: bool,
    /// When enabled the logger is initialised at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub guide: GuideSettings,
}

fn default_width_percentage() -> f64 {
    DEFAULT_WIDTH_PERCENTAGE
}

fn default_height_percentage() -> f64 {
    DEFAULT_HEIGHT_PERCENTAGE
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            width_percentage: default_width_percentage(),
            height_percentage: default_height_percentage(),
            alpha: default_alpha(),
            enabled: false,
            debug_logging: false,
            guide: GuideSettings::default(),
        }
    }
}

impl MaskSettings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Mask configuration with out-of-range values clamped.
    pub fn mask_config(&self) -> MaskConfig {
        MaskConfig::new(self.width_percentage, self.height_percentage, self.alpha).sanitized()
    }

    /// Applies the stored configuration to `mask`, then shows it when
    /// `enabled` is set and removes it otherwise.
    pub fn apply<H: Host + 'static>(&self, mask: &ReadingMask<H>) {
        let config = self.mask_config();
        mask.canvas_offset_change(
            config.unit.width_percentage,
            config.unit.height_percentage,
            config.alpha,
        );
        if self.enabled {
            mask.initialize();
        } else {
            mask.remove_canvas();
        }
    }

    /// Stores a configuration previously applied to the mask.
    pub fn set_mask_config(&mut self, config: MaskConfig) {
        self.width_percentage = config.unit.width_percentage;
        self.height_percentage = config.unit.height_percentage;
        self.alpha = config.alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::MaskSettings;

    #[test]
    fn missing_fields_use_defaults() {
        let settings: MaskSettings = serde_json::from_str(r#"{"alpha": 0.6}"#).unwrap();
        assert_eq!(settings.alpha, 0.6);
        assert_eq!(settings.width_percentage, 100.0);
        assert_eq!(settings.height_percentage, 25.0);
        assert!(!settings.enabled);
        assert_eq!(settings.guide.ring_size, 15.0);
    }

    #[test]
    fn mask_config_is_sanitized() {
        let settings = MaskSettings {
            width_percentage: 250.0,
            alpha: 3.0,
            ..Default::default()
        };
        let config = settings.mask_config();
        assert_eq!(config.unit.width_percentage, 100.0);
        assert_eq!(config.alpha, 1.0);
    }
}
