//! Simulation configuration.
//!
//! Loaded from the `[simulation]` table of the autocharge configuration.
//! All lengths are millimetres, all periods milliseconds.

use autodock_common::hal::driver::HalError;
use serde::{Deserialize, Serialize};

fn default_physics_period_ms() -> u64 {
    5
}

fn default_ground_period_ms() -> u64 {
    20
}

fn default_capture_latency_ms() -> u64 {
    20
}

fn default_arena_half_size() -> f64 {
    500.0
}

fn default_line_start_x() -> f64 {
    -350.0
}

fn default_line_width() -> f64 {
    40.0
}

fn default_dock_x() -> f64 {
    450.0
}

fn default_dock_half_width() -> f64 {
    40.0
}

fn default_floor_reflectance() -> u16 {
    1000
}

fn default_line_reflectance() -> u16 {
    300
}

fn default_dock_lit_brightness() -> u8 {
    230
}

fn default_ambient_brightness() -> u8 {
    60
}

fn default_cruise_speed() -> i16 {
    500
}

/// Initial robot pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartPose {
    /// X [mm].
    #[serde(default)]
    pub x: f64,
    /// Y [mm].
    #[serde(default)]
    pub y: f64,
    /// Heading [deg], 0 = towards the dock.
    #[serde(default)]
    pub heading_deg: f64,
}

impl Default for StartPose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: -250.0,
            heading_deg: 80.0,
        }
    }
}

/// Simulated arena, floor line, dock and timing.
///
/// The guide line runs along the x axis from `line_start_x` to the dock face
/// at `dock_x`. The arena is a square of side `2 * arena_half_size` centered
/// on the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Physics integration period.
    #[serde(default = "default_physics_period_ms")]
    pub physics_period_ms: u64,
    /// Ground reading publication period.
    #[serde(default = "default_ground_period_ms")]
    pub ground_period_ms: u64,
    /// Time between a capture trigger and the frame becoming ready.
    #[serde(default = "default_capture_latency_ms")]
    pub capture_latency_ms: u64,
    /// Half the arena side.
    #[serde(default = "default_arena_half_size")]
    pub arena_half_size: f64,
    /// X of the far end of the guide line.
    #[serde(default = "default_line_start_x")]
    pub line_start_x: f64,
    /// Guide line width.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// X of the dock face.
    #[serde(default = "default_dock_x")]
    pub dock_x: f64,
    /// Half width of the dock face.
    #[serde(default = "default_dock_half_width")]
    pub dock_half_width: f64,
    /// Ground reflectance off the line.
    #[serde(default = "default_floor_reflectance")]
    pub floor_reflectance: u16,
    /// Ground reflectance on the line.
    #[serde(default = "default_line_reflectance")]
    pub line_reflectance: u16,
    /// Camera brightness while the charge contacts touch.
    #[serde(default = "default_dock_lit_brightness")]
    pub dock_lit_brightness: u8,
    /// Camera brightness otherwise.
    #[serde(default = "default_ambient_brightness")]
    pub ambient_brightness: u8,
    /// Wheel speed of the wander behavior [ticks/s].
    #[serde(default = "default_cruise_speed")]
    pub cruise_speed: i16,
    /// Initial pose.
    #[serde(default)]
    pub start: StartPose,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            physics_period_ms: default_physics_period_ms(),
            ground_period_ms: default_ground_period_ms(),
            capture_latency_ms: default_capture_latency_ms(),
            arena_half_size: default_arena_half_size(),
            line_start_x: default_line_start_x(),
            line_width: default_line_width(),
            dock_x: default_dock_x(),
            dock_half_width: default_dock_half_width(),
            floor_reflectance: default_floor_reflectance(),
            line_reflectance: default_line_reflectance(),
            dock_lit_brightness: default_dock_lit_brightness(),
            ambient_brightness: default_ambient_brightness(),
            cruise_speed: default_cruise_speed(),
            start: StartPose::default(),
        }
    }
}

impl SimConfig {
    /// Validate the simulation configuration.
    ///
    /// # Validation Rules
    /// 1. All periods > 0
    /// 2. Ground period is a multiple of the physics period
    /// 3. Line and dock lie inside the arena, line ends at the dock
    /// 4. Start pose inside the arena
    pub fn validate(&self) -> Result<(), HalError> {
        if self.physics_period_ms == 0 || self.ground_period_ms == 0 {
            return Err(HalError::ConfigError(
                "simulation periods must be greater than 0".to_string(),
            ));
        }
        if self.ground_period_ms % self.physics_period_ms != 0 {
            return Err(HalError::ConfigError(format!(
                "ground_period_ms ({}) must be a multiple of physics_period_ms ({})",
                self.ground_period_ms, self.physics_period_ms
            )));
        }
        let half = self.arena_half_size;
        if half <= 0.0 || self.line_width <= 0.0 || self.dock_half_width <= 0.0 {
            return Err(HalError::ConfigError(
                "arena, line and dock sizes must be positive".to_string(),
            ));
        }
        if self.line_start_x >= self.dock_x {
            return Err(HalError::ConfigError(format!(
                "line_start_x ({}) must be before dock_x ({})",
                self.line_start_x, self.dock_x
            )));
        }
        if self.line_start_x < -half || self.dock_x > half {
            return Err(HalError::ConfigError(
                "line and dock must lie inside the arena".to_string(),
            ));
        }
        if self.start.x.abs() >= half || self.start.y.abs() >= half {
            return Err(HalError::ConfigError(format!(
                "start pose ({}, {}) outside the arena",
                self.start.x, self.start.y
            )));
        }
        Ok(())
    }
}
