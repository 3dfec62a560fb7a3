//! Peripheral trait implementations backed by the shared `SimWorld`.

use autodock_common::hal::driver::{
    HalError, IndicatorLights, MotionController, ObstacleAvoidance, Vision,
};
use autodock_common::hal::types::{CameraConfig, CaptureMode, Indicators, Wheel};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use super::world::SimWorld;

/// Shared handle to the world.
pub type WorldHandle = Arc<Mutex<SimWorld>>;

/// Wheel motors and encoders.
pub struct SimMotion {
    world: WorldHandle,
    poll: Duration,
}

impl SimMotion {
    /// Motors polling the encoders every `poll` during blocking maneuvers.
    pub fn new(world: WorldHandle, poll: Duration) -> Self {
        Self { world, poll }
    }
}

impl MotionController for SimMotion {
    fn set_speed(&mut self, wheel: Wheel, speed: i16) {
        self.world.lock().set_speed(wheel, speed);
    }

    fn set_position(&mut self, wheel: Wheel, position: i32) {
        self.world.lock().set_encoder(wheel, position);
    }

    fn position(&self, wheel: Wheel) -> i32 {
        self.world.lock().encoder(wheel)
    }

    fn speed(&self, wheel: Wheel) -> i16 {
        self.world.lock().speed(wheel)
    }

    fn wait_poll(&mut self) {
        std::thread::sleep(self.poll);
    }
}

/// One-shot camera watching the dock's charge indicator.
pub struct SimVision {
    world: WorldHandle,
    running: Arc<AtomicBool>,
    config: CameraConfig,
    frame: Vec<u8>,
    synced_frames: u64,
}

impl SimVision {
    /// Camera reading from `world`; `running` bounds the readiness wait.
    pub fn new(world: WorldHandle, running: Arc<AtomicBool>) -> Self {
        let config = CameraConfig::default();
        Self {
            world,
            running,
            frame: vec![0; config.frame_len()],
            config,
            synced_frames: 0,
        }
    }

    fn sync_frame(&mut self) {
        let world = self.world.lock();
        if world.frames() != self.synced_frames {
            self.synced_frames = world.frames();
            self.frame.fill(world.frame_value());
        }
    }
}

impl Vision for SimVision {
    fn configure(&mut self, config: &CameraConfig) -> Result<(), HalError> {
        config.validate().map_err(HalError::ConfigError)?;
        if config.capture_mode != CaptureMode::OneShot {
            return Err(HalError::ConfigError(
                "simulated camera only supports one-shot capture".to_string(),
            ));
        }
        self.config = *config;
        self.frame = vec![0; config.frame_len()];
        info!(
            "Camera configured: {:?} {}x{} at ({}, {}), exposure {}",
            config.format, config.width, config.height, config.x, config.y, config.exposure
        );
        Ok(())
    }

    fn trigger_capture(&mut self) {
        self.world.lock().trigger_capture();
    }

    fn is_frame_ready(&self) -> bool {
        self.world.lock().frame_ready()
    }

    fn wait_frame_ready(&mut self) {
        while !self.world.lock().frame_ready() {
            if !self.running.load(Ordering::SeqCst) {
                debug!("Simulation stopped while waiting for a frame");
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn last_frame(&mut self) -> &[u8] {
        self.sync_frame();
        &self.frame
    }
}

/// Status lights.
pub struct SimIndicators {
    world: WorldHandle,
}

impl SimIndicators {
    /// Lights stored in `world`.
    pub fn new(world: WorldHandle) -> Self {
        Self { world }
    }
}

impl IndicatorLights for SimIndicators {
    fn set_body(&mut self, on: bool) {
        self.world.lock().set_indicators(Indicators::BODY, on);
    }

    fn set_front(&mut self, on: bool) {
        self.world.lock().set_indicators(Indicators::FRONT, on);
    }

    fn clear_all(&mut self) {
        self.world.lock().set_indicators(Indicators::all(), false);
    }
}

/// Wander/avoid behavior switch.
pub struct SimAvoidance {
    world: WorldHandle,
}

impl SimAvoidance {
    /// Behavior running inside `world`.
    pub fn new(world: WorldHandle) -> Self {
        Self { world }
    }
}

impl ObstacleAvoidance for SimAvoidance {
    fn calibrate(&mut self) {
        let ambient = self.world.lock().proximity();
        info!("Proximity sensors calibrated (ambient={})", ambient);
    }

    fn enable(&mut self, threshold: u16) {
        self.world.lock().set_avoidance(Some(threshold));
    }

    fn disable(&mut self) {
        self.world.lock().set_avoidance(None);
    }

    fn is_enabled(&self) -> bool {
        self.world.lock().avoidance().is_some()
    }
}
