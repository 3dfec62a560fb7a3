//! TOML configuration loader with validation.
//!
//! One file, one `AutochargeConfig`. Every section and field is optional and
//! falls back to the values in `autodock_common::consts`, so an empty file is
//! a valid configuration.
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//!
//! [thresholds]
//! line = 520
//!
//! [timing]
//! charge_s = 45
//! ```

use std::path::Path;

use autodock_common::config::{ConfigError, ConfigLoader, SharedConfig};
use autodock_common::consts::*;
use autodock_common::hal::types::CameraConfig;
use autodock_hal::SimConfig;
use serde::{Deserialize, Serialize};

use crate::control::line_follow::CenteringParams;
use crate::maneuver::ManeuverParams;

// ─── Sections ───────────────────────────────────────────────────────

/// Sensor thresholds and debounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Ground reflectance below which a channel sees the line.
    pub line: u16,
    /// Ground reflectance above which an outer channel is off the line.
    pub off_line: u16,
    /// Brightness above which the dock indicator counts as lit.
    pub contact_made: u8,
    /// Brightness below which charging contact is lost.
    pub contact_lost: u8,
    /// Consecutive qualifying samples needed; the condition fires on the next one.
    pub debounce: u16,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            line: GROUND_LINE_THRESHOLD,
            off_line: GROUND_OFF_LINE_THRESHOLD,
            contact_made: CONTACT_MADE_BRIGHTNESS,
            contact_lost: CONTACT_LOST_BRIGHTNESS,
            debounce: DEBOUNCE_COUNT,
        }
    }
}

/// Per-state time limits [s].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Time spent wandering before searching for the line.
    pub explore_s: u16,
    /// Explore bookkeeping period.
    pub explore_bookkeeping_s: u16,
    /// Give up searching after this long.
    pub search_timeout_s: u16,
    /// Presumed stuck while following after this long.
    pub follow_stuck_s: u16,
    /// Charge duration.
    pub charge_s: u16,
    /// Escape attempts before aborting back to Explore.
    pub max_escape_attempts: u8,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            explore_s: EXPLORE_DURATION_S,
            explore_bookkeeping_s: EXPLORE_BOOKKEEPING_PERIOD_S,
            search_timeout_s: SEARCH_TIMEOUT_S,
            follow_stuck_s: FOLLOW_STUCK_S,
            charge_s: CHARGE_DURATION_S,
            max_escape_attempts: MAX_ESCAPE_ATTEMPTS,
        }
    }
}

/// Wheel speeds [ticks/s] and maneuver distances [ticks].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Hard pivot speed.
    pub turn_speed: i16,
    /// Lower bound of the straight-line speed.
    pub follow_speed_min: i16,
    /// Upper bound of the straight-line speed.
    pub follow_speed_max: i16,
    /// Pending speed is `speed_base - channel`.
    pub speed_base: u16,
    /// Escape pivot speed magnitude.
    pub escape_speed: i16,
    /// Escape pivot distance per wheel.
    pub escape_ticks: i32,
    /// Reverse speed magnitude.
    pub reverse_speed: i16,
    /// Reverse distance.
    pub reverse_ticks: i32,
    /// Disengage pivot distance.
    pub disengage_ticks: i32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            turn_speed: TURN_SPEED,
            follow_speed_min: FOLLOW_SPEED_MIN,
            follow_speed_max: FOLLOW_SPEED_MAX,
            speed_base: FOLLOW_SPEED_BASE,
            escape_speed: ESCAPE_SPEED,
            escape_ticks: ESCAPE_TICKS,
            reverse_speed: REVERSE_SPEED,
            reverse_ticks: REVERSE_TICKS,
            disengage_ticks: DISENGAGE_PIVOT_TICKS,
        }
    }
}

/// Obstacle-avoidance sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Proximity threshold passed to `enable()`.
    pub threshold: u16,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            threshold: AVOIDANCE_THRESHOLD,
        }
    }
}

// ─── Root ───────────────────────────────────────────────────────────

/// Complete control unit configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutochargeConfig {
    /// Service name and log level.
    pub shared: SharedConfig,
    /// Sensor thresholds.
    pub thresholds: ThresholdConfig,
    /// Per-state time limits.
    pub timing: TimingConfig,
    /// Speeds and maneuver distances.
    pub motion: MotionConfig,
    /// Obstacle avoidance.
    pub avoidance: AvoidanceConfig,
    /// One-time camera setup.
    pub camera: CameraConfig,
    /// Simulation driver parameters.
    pub simulation: SimConfig,
}

impl AutochargeConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` naming the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let t = &self.thresholds;
        if t.contact_lost >= t.contact_made {
            return Err(invalid(format!(
                "thresholds.contact_lost ({}) must be below thresholds.contact_made ({})",
                t.contact_lost, t.contact_made
            )));
        }
        if t.line >= t.off_line {
            return Err(invalid(format!(
                "thresholds.line ({}) must be below thresholds.off_line ({})",
                t.line, t.off_line
            )));
        }
        if t.debounce == 0 {
            return Err(invalid("thresholds.debounce must be > 0".into()));
        }

        let tm = &self.timing;
        for (name, value) in [
            ("explore_s", tm.explore_s),
            ("explore_bookkeeping_s", tm.explore_bookkeeping_s),
            ("search_timeout_s", tm.search_timeout_s),
            ("follow_stuck_s", tm.follow_stuck_s),
            ("charge_s", tm.charge_s),
        ] {
            if value == 0 {
                return Err(invalid(format!("timing.{name} must be > 0")));
            }
        }
        if tm.max_escape_attempts == 0 {
            return Err(invalid("timing.max_escape_attempts must be > 0".into()));
        }

        let m = &self.motion;
        if m.follow_speed_min <= 0 || m.follow_speed_min > m.follow_speed_max {
            return Err(invalid(format!(
                "motion speed range [{}, {}] is empty or not positive",
                m.follow_speed_min, m.follow_speed_max
            )));
        }
        for (name, value) in [
            ("turn_speed", m.turn_speed),
            ("escape_speed", m.escape_speed),
            ("reverse_speed", m.reverse_speed),
        ] {
            if value <= 0 {
                return Err(invalid(format!("motion.{name} must be > 0")));
            }
        }
        for (name, value) in [
            ("escape_ticks", m.escape_ticks),
            ("reverse_ticks", m.reverse_ticks),
            ("disengage_ticks", m.disengage_ticks),
        ] {
            if value <= 0 {
                return Err(invalid(format!("motion.{name} must be > 0")));
            }
        }

        self.camera
            .validate()
            .map_err(|e| invalid(format!("camera: {e}")))?;
        self.simulation
            .validate()
            .map_err(|e| invalid(format!("simulation: {e}")))?;
        Ok(())
    }

    /// Parameters of the line-centering law.
    pub fn centering(&self) -> CenteringParams {
        CenteringParams {
            threshold: self.thresholds.line,
            turn_speed: self.motion.turn_speed,
            speed_min: self.motion.follow_speed_min,
            speed_max: self.motion.follow_speed_max,
            speed_base: self.motion.speed_base,
        }
    }

    /// Parameters of the open-loop maneuvers.
    pub fn maneuvers(&self) -> ManeuverParams {
        ManeuverParams {
            escape_speed: self.motion.escape_speed,
            escape_ticks: self.motion.escape_ticks,
            reverse_speed: self.motion.reverse_speed,
            reverse_ticks: self.motion.reverse_ticks,
            pivot_speed: self.motion.turn_speed,
            pivot_ticks: self.motion.disengage_ticks,
        }
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AutochargeConfig, ConfigError> {
    let config = AutochargeConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate the configuration from a TOML string.
pub fn load_config_from_str(content: &str) -> Result<AutochargeConfig, ConfigError> {
    let config = AutochargeConfig::from_toml(content)?;
    config.validate()?;
    Ok(config)
}
