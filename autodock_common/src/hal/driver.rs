//! Peripheral traits and error types.
//!
//! This module defines:
//! - `SensorFeed` - Blocking source of ground readings
//! - `Vision` - One-shot camera
//! - `MotionController` - Wheel speed and encoder position
//! - `ObstacleAvoidance` - External wander/avoid behavior switch
//! - `IndicatorLights` - Status lights
//! - `Peripherals` - Command-side drivers bundled for the control loop
//! - `HalError` - Errors raised while building or configuring drivers
//!
//! Runtime calls are infallible: a failing sensor simply produces values
//! that the threshold logic absorbs.

use std::time::Duration;
use thiserror::Error;

use crate::consts::MANEUVER_POLL_MS;
use crate::hal::types::{CameraConfig, GroundReading, Wheel};

/// Error types for driver construction and configuration.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
}

/// Blocking source of ground readings, one per control tick.
pub trait SensorFeed: Send {
    /// Wait for the next reading.
    ///
    /// Returns `None` when the feed has shut down.
    fn wait_reading(&mut self) -> Option<GroundReading>;
}

/// Single-frame camera.
///
/// The control loop triggers a capture, later checks readiness and reads the
/// last completed frame. Only one frame buffer exists.
pub trait Vision: Send {
    /// Apply the one-time camera setup.
    fn configure(&mut self, config: &CameraConfig) -> Result<(), HalError>;

    /// Start capturing one frame (fire-and-forget).
    fn trigger_capture(&mut self);

    /// `true` when the last triggered capture has completed.
    fn is_frame_ready(&self) -> bool;

    /// Block until the pending capture completes.
    fn wait_frame_ready(&mut self);

    /// Last completed frame.
    ///
    /// Takes `&mut self` so drivers can copy a completed capture into their
    /// frame buffer.
    fn last_frame(&mut self) -> &[u8];
}

/// Wheel speed/position interface of the motor driver.
///
/// Speeds are signed encoder ticks per second; positions are encoder ticks
/// counted since the last `set_position` on that wheel.
pub trait MotionController: Send {
    /// Set the speed of one wheel.
    fn set_speed(&mut self, wheel: Wheel, speed: i16);

    /// Overwrite the encoder position of one wheel.
    fn set_position(&mut self, wheel: Wheel, position: i32);

    /// Current encoder position of one wheel.
    fn position(&self, wheel: Wheel) -> i32;

    /// Last speed set on one wheel.
    fn speed(&self, wheel: Wheel) -> i16;

    /// Let one polling interval pass while a blocking maneuver runs.
    fn wait_poll(&mut self) {
        std::thread::sleep(Duration::from_millis(MANEUVER_POLL_MS));
    }

    /// Set both wheel speeds.
    fn set_speeds(&mut self, left: i16, right: i16) {
        self.set_speed(Wheel::Left, left);
        self.set_speed(Wheel::Right, right);
    }

    /// Stop both wheels.
    fn stop(&mut self) {
        self.set_speeds(0, 0);
    }
}

/// Switch for the external obstacle-avoidance behavior.
pub trait ObstacleAvoidance: Send {
    /// Calibrate the proximity sensors the behavior relies on.
    fn calibrate(&mut self);

    /// Enable avoidance with the given proximity threshold.
    fn enable(&mut self, threshold: u16);

    /// Disable avoidance.
    fn disable(&mut self);

    /// Whether avoidance is currently enabled.
    fn is_enabled(&self) -> bool;
}

/// Status lights.
pub trait IndicatorLights: Send {
    /// Set the body light.
    fn set_body(&mut self, on: bool);

    /// Set the front light.
    fn set_front(&mut self, on: bool);

    /// Turn every light off.
    fn clear_all(&mut self);
}

/// Command-side drivers used by the control step.
pub struct Peripherals {
    /// Wheel motors and encoders.
    pub motion: Box<dyn MotionController>,
    /// Camera.
    pub vision: Box<dyn Vision>,
    /// Status lights.
    pub indicators: Box<dyn IndicatorLights>,
    /// Obstacle-avoidance behavior.
    pub avoidance: Box<dyn ObstacleAvoidance>,
}

impl Peripherals {
    /// Bundle boxed drivers.
    pub fn new(
        motion: Box<dyn MotionController>,
        vision: Box<dyn Vision>,
        indicators: Box<dyn IndicatorLights>,
        avoidance: Box<dyn ObstacleAvoidance>,
    ) -> Self {
        Self {
            motion,
            vision,
            indicators,
            avoidance,
        }
    }
}

impl std::fmt::Debug for Peripherals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peripherals")
            .field("avoidance_enabled", &self.avoidance.is_enabled())
            .field("frame_ready", &self.vision.is_frame_ready())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Wheels {
        speed: [i16; 2],
        pos: [i32; 2],
    }

    impl MotionController for Wheels {
        fn set_speed(&mut self, wheel: Wheel, speed: i16) {
            self.speed[wheel.index()] = speed;
        }

        fn set_position(&mut self, wheel: Wheel, position: i32) {
            self.pos[wheel.index()] = position;
        }

        fn position(&self, wheel: Wheel) -> i32 {
            self.pos[wheel.index()]
        }

        fn speed(&self, wheel: Wheel) -> i16 {
            self.speed[wheel.index()]
        }
    }

    #[test]
    fn test_hal_error_display() {
        let err = HalError::InitFailed("camera".to_string());
        assert!(err.to_string().contains("camera"));

        let err = HalError::DriverNotFound("ethercat".to_string());
        assert!(err.to_string().contains("ethercat"));
    }

    #[test]
    fn provided_speed_helpers() {
        let mut w = Wheels::default();
        w.set_speeds(-300, 300);
        assert_eq!(w.speed(Wheel::Left), -300);
        assert_eq!(w.speed(Wheel::Right), 300);
        w.stop();
        assert_eq!(w.speed, [0, 0]);
    }
}
