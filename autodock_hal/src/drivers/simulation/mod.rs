//! Simulation driver module.
//!
//! Software model of the robot, the floor with its guide line and the
//! charging dock, for running the control unit without hardware.

pub mod config;
pub mod peripherals;
pub mod world;

pub use config::{SimConfig, StartPose};
pub use peripherals::{SimAvoidance, SimIndicators, SimMotion, SimVision, WorldHandle};
pub use world::{Pose, SimWorld};

use autodock_common::bus::Topic;
use autodock_common::consts::{GROUND_TOPIC, MANEUVER_POLL_MS};
use autodock_common::hal::driver::{HalError, Peripherals};
use autodock_common::hal::types::GroundReading;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::{SimCore, PhysicsStats};

/// Simulation driver: owns the world, the ground topic and the physics thread.
pub struct SimulationDriver {
    config: SimConfig,
    world: WorldHandle,
    ground: Topic<GroundReading>,
    running: Arc<AtomicBool>,
    physics: Option<JoinHandle<PhysicsStats>>,
}

impl SimulationDriver {
    /// Build the driver. The physics loop does not run until [`start`](Self::start).
    ///
    /// # Errors
    /// Returns `HalError::ConfigError` if the configuration is invalid.
    pub fn new(config: SimConfig) -> Result<Self, HalError> {
        config.validate()?;
        let world = Arc::new(Mutex::new(SimWorld::new(config.clone())));
        Ok(Self {
            config,
            world,
            ground: Topic::new(GROUND_TOPIC),
            running: Arc::new(AtomicBool::new(false)),
            physics: None,
        })
    }

    /// Driver identifier.
    pub fn name(&self) -> &'static str {
        "simulation"
    }

    /// Driver version.
    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Shared world handle.
    pub fn world(&self) -> WorldHandle {
        Arc::clone(&self.world)
    }

    /// Topic carrying the simulated ground readings.
    pub fn ground_topic(&self) -> Topic<GroundReading> {
        self.ground.clone()
    }

    /// Command-side peripherals wired to the world.
    pub fn peripherals(&self) -> Peripherals {
        Peripherals::new(
            Box::new(SimMotion::new(
                self.world(),
                Duration::from_millis(MANEUVER_POLL_MS),
            )),
            Box::new(SimVision::new(self.world(), Arc::clone(&self.running))),
            Box::new(SimIndicators::new(self.world())),
            Box::new(SimAvoidance::new(self.world())),
        )
    }

    /// Start the physics thread.
    ///
    /// # Errors
    /// Returns `HalError::InitFailed` if already started or the thread cannot spawn.
    pub fn start(&mut self) -> Result<(), HalError> {
        if self.physics.is_some() {
            return Err(HalError::InitFailed(
                "simulation already running".to_string(),
            ));
        }
        self.running.store(true, Ordering::SeqCst);
        let core = SimCore::new(
            self.world(),
            self.ground.clone(),
            Arc::clone(&self.running),
            &self.config,
        );
        let handle = core
            .spawn()
            .map_err(|e| HalError::InitFailed(format!("physics thread: {e}")))?;
        self.physics = Some(handle);
        info!(
            "Simulation driver v{} started (start pose {:?})",
            self.version(),
            self.config.start
        );
        Ok(())
    }

    /// Stop the physics thread and close the ground topic.
    pub fn shutdown(&mut self) -> Result<(), HalError> {
        info!("Shutting down simulation driver");
        self.running.store(false, Ordering::SeqCst);
        self.ground.close();
        if let Some(handle) = self.physics.take() {
            match handle.join() {
                Ok(stats) => info!(
                    "Physics: {} ticks, {} readings, avg={}us, max={}us",
                    stats.ticks,
                    stats.readings_published,
                    stats.avg_tick_us(),
                    stats.max_tick_us
                ),
                Err(_) => warn!("Physics thread panicked"),
            }
        }
        Ok(())
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        if self.physics.is_some() {
            let _ = self.shutdown();
        }
    }
}
