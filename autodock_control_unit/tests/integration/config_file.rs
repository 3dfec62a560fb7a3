//! The shipped configuration file.

use std::path::Path;

use autodock_common::config::LogLevel;
use autodock_control_unit::config::{AutochargeConfig, load_config};

#[test]
fn shipped_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/autocharge.toml");
    let loaded = load_config(&path).unwrap();
    let defaults = AutochargeConfig::default();

    assert_eq!(loaded.shared.log_level, LogLevel::Info);
    assert_eq!(loaded.thresholds, defaults.thresholds);
    assert_eq!(loaded.timing, defaults.timing);
    assert_eq!(loaded.motion, defaults.motion);
    assert_eq!(loaded.avoidance, defaults.avoidance);
    assert_eq!(loaded.camera, defaults.camera);
    assert_eq!(loaded.simulation, defaults.simulation);
}
