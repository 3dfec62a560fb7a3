//! Fixed-period physics loop.
//!
//! `SimCore` advances the simulated world at the configured physics period
//! and publishes a ground reading on the `/ground` topic every
//! `ground_period_ms`, the way the real sensor driver publishes one reading
//! per acquisition.

use autodock_common::bus::Topic;
use autodock_common::hal::types::GroundReading;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::drivers::simulation::SimConfig;
use crate::drivers::simulation::peripherals::WorldHandle;

/// Ticks between periodic debug lines.
const REPORT_EVERY_TICKS: u64 = 1000;

/// Overruns reported individually before switching to sampled reporting.
const OVERRUN_LOG_BURST: u64 = 10;

/// Physics loop counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsStats {
    /// Physics ticks executed.
    pub ticks: u64,
    /// Ticks whose work took longer than the period.
    pub overruns: u64,
    /// Slowest tick [µs].
    pub max_tick_us: u64,
    /// Sum of tick durations [µs].
    pub total_tick_us: u64,
    /// Ground readings published.
    pub readings_published: u64,
}

impl PhysicsStats {
    /// Average tick duration [µs] (0 before the first tick).
    pub fn avg_tick_us(&self) -> u64 {
        self.total_tick_us.checked_div(self.ticks).unwrap_or(0)
    }

    /// Account for one tick of `us` microseconds against a `budget_us` period.
    /// Returns true on overrun.
    fn record(&mut self, us: u64, budget_us: u64) -> bool {
        self.total_tick_us += us;
        self.max_tick_us = self.max_tick_us.max(us);
        let over = us > budget_us;
        if over {
            self.overruns += 1;
        }
        over
    }
}

/// Physics loop driving a `SimWorld`.
pub struct SimCore {
    world: WorldHandle,
    ground: Topic<GroundReading>,
    running: Arc<AtomicBool>,
    period: Duration,
    publish_every: u64,
    stats: PhysicsStats,
}

impl SimCore {
    /// Create a loop for `world` publishing on `ground` while `running` is set.
    pub fn new(
        world: WorldHandle,
        ground: Topic<GroundReading>,
        running: Arc<AtomicBool>,
        config: &SimConfig,
    ) -> Self {
        let physics = config.physics_period_ms.max(1);
        Self {
            world,
            ground,
            running,
            period: Duration::from_millis(physics),
            publish_every: (config.ground_period_ms / physics).max(1),
            stats: PhysicsStats::default(),
        }
    }

    /// Advance the world by one physics period and publish if due.
    pub fn step(&mut self) {
        self.stats.ticks += 1;
        let due = self.stats.ticks % self.publish_every == 0;
        let reading = {
            let mut world = self.world.lock();
            world.advance(self.period.as_secs_f64());
            due.then(|| world.ground_reading())
        };

        if let Some(reading) = reading {
            trace!("Publishing {} {:?}", self.ground.name(), reading.delta);
            self.ground.publish(reading);
            self.stats.readings_published += 1;
        }
    }

    /// Run until the running flag clears. Returns the final statistics.
    pub fn run(mut self) -> PhysicsStats {
        let budget_us = self.period.as_micros() as u64;
        info!(
            "Physics running at {}ms, ground reading every {} ticks",
            self.period.as_millis(),
            self.publish_every
        );

        while self.running.load(Ordering::SeqCst) {
            let started = Instant::now();
            self.step();
            let took = started.elapsed();

            let us = took.as_micros() as u64;
            if self.stats.record(us, budget_us)
                && (self.stats.overruns <= OVERRUN_LOG_BURST
                    || self.stats.overruns % REPORT_EVERY_TICKS == 0)
            {
                warn!(
                    "Physics overrun #{}: {}us for a {}us period",
                    self.stats.overruns, us, budget_us
                );
            }

            if let Some(rest) = self.period.checked_sub(took) {
                std::thread::sleep(rest);
            }

            if self.stats.ticks % REPORT_EVERY_TICKS == 0 {
                debug!(
                    "Physics: {} ticks, {} readings, avg={}us, max={}us",
                    self.stats.ticks,
                    self.stats.readings_published,
                    self.stats.avg_tick_us(),
                    self.stats.max_tick_us
                );
            }
        }

        info!(
            "Physics stopped after {} ticks ({} overruns)",
            self.stats.ticks, self.stats.overruns
        );
        self.stats
    }

    /// Run on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<PhysicsStats>> {
        std::thread::Builder::new()
            .name("sim-physics".to_string())
            .spawn(move || self.run())
    }

    /// Statistics so far.
    pub fn stats(&self) -> PhysicsStats {
        self.stats
    }
}
