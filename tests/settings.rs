use std::rc::Rc;

use reading_mask::headless::HeadlessHost;
use reading_mask::mask::{MaskConfig, ReadingMask, Size};
use reading_mask::settings::MaskSettings;
use tempfile::tempdir;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let settings = MaskSettings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings, MaskSettings::default());
}

#[test]
fn blank_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blank.json");
    std::fs::write(&path, "  \n").unwrap();
    let settings = MaskSettings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings, MaskSettings::default());
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(MaskSettings::load(path.to_str().unwrap()).is_err());
}

#[test]
fn save_then_load_keeps_mask_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let path = path.to_str().unwrap();

    let mut settings = MaskSettings::default();
    settings.enabled = true;
    settings.set_mask_config(MaskConfig::new(60.0, 15.0, 0.8));
    settings.guide.ring_size = 20.0;
    settings.save(path).unwrap();

    let loaded = MaskSettings::load(path).unwrap();
    assert_eq!(loaded, settings);
    let config = loaded.mask_config();
    assert_eq!(config.unit.width_percentage, 60.0);
    assert_eq!(config.unit.height_percentage, 15.0);
    assert_eq!(config.alpha, 0.8);
}

#[test]
fn enabled_settings_show_the_mask() {
    let host = Rc::new(HeadlessHost::new(Size::new(1000.0, 800.0)));
    let mask = ReadingMask::new(host.clone());
    let mut settings = MaskSettings::default();
    settings.enabled = true;
    settings.set_mask_config(MaskConfig::new(50.0, 10.0, 0.6));

    settings.apply(&mask);
    assert!(mask.is_active());
    assert!(host.has_surface());
    assert_eq!(mask.canvas_state().window(), Size::new(500.0, 80.0));
    assert_eq!(mask.config().alpha, 0.6);
}

#[test]
fn disabled_settings_hide_the_mask() {
    let host = Rc::new(HeadlessHost::new(Size::new(1000.0, 800.0)));
    let mask = ReadingMask::new(host.clone());
    mask.initialize();

    MaskSettings::default().apply(&mask);
    assert!(!mask.is_active());
    assert_eq!(host.registration_count(), 0);
}
