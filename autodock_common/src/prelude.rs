//! Prelude module for common re-exports.
//!
//! ```rust
//! use autodock_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── Transport ──────────────────────────────────────────────────────
pub use crate::bus::{Subscriber, Topic};

// ─── Peripherals ────────────────────────────────────────────────────
pub use crate::hal::driver::{
    HalError, IndicatorLights, MotionController, ObstacleAvoidance, Peripherals, SensorFeed,
    Vision,
};
pub use crate::hal::types::{CameraConfig, GroundReading, Indicators, Wheel};

/// Default period of the elapsed-seconds source.
pub const DEFAULT_TIMEBASE_PERIOD: Duration =
    Duration::from_millis(crate::consts::TIMEBASE_PERIOD_MS);
