//! Reading-driven control loop.
//!
//! The loop blocks on the ground feed and runs exactly one state machine
//! step per reading. It ends when the running flag clears, the feed shuts
//! down, or an optional step limit is reached.
//!
//! ```text
//!  SensorFeed ──wait──▶ AutochargeFsm::step ──▶ Peripherals
//!                               ▲
//!                          Timebase (1 Hz)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use autodock_common::hal::driver::{HalError, Peripherals, SensorFeed};
use thiserror::Error;
use tracing::{debug, info};

use crate::fsm::{AutochargeFsm, StepOutcome};
use crate::state::machine::{FsmState, TransitionCause};

/// Steps between periodic statistics log lines.
pub const STATS_LOG_INTERVAL: u64 = 100;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Per-step counters and latency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Steps executed.
    pub steps: u64,
    /// Transitions into each state, indexed by [`FsmState::index`].
    pub entries: [u64; 4],
    /// Escape pivots.
    pub escapes: u64,
    /// Escape sequences that ended in the reverse-and-explore abort.
    pub aborts: u64,
    /// Dock disengage maneuvers.
    pub disengages: u64,
    /// Longest step [µs], including blocking waits and maneuvers.
    pub max_step_us: u64,
    /// Sum of step durations [µs].
    pub total_step_us: u64,
}

impl CycleStats {
    /// Zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one step.
    pub fn record(&mut self, outcome: &StepOutcome, duration_us: u64) {
        self.steps += 1;
        self.total_step_us += duration_us;
        self.max_step_us = self.max_step_us.max(duration_us);
        if outcome.escaped {
            self.escapes += 1;
        }
        if let Some(t) = outcome.transition {
            self.entries[t.to.index()] += 1;
            match t.cause {
                TransitionCause::EscapeAbort => self.aborts += 1,
                TransitionCause::ChargeComplete => self.disengages += 1,
                _ => {}
            }
        }
    }

    /// Transitions into `state`.
    pub fn entries_into(&self, state: FsmState) -> u64 {
        self.entries[state.index()]
    }

    /// Average step duration [µs] (0 if no steps).
    pub fn avg_step_us(&self) -> u64 {
        if self.steps == 0 {
            0
        } else {
            self.total_step_us / self.steps
        }
    }
}

// ─── Error Type ─────────────────────────────────────────────────────

/// Control loop setup errors. Steps themselves cannot fail.
#[derive(Debug, Error)]
pub enum CycleError {
    /// A peripheral rejected the startup configuration.
    #[error("peripheral startup failed: {0}")]
    Startup(#[from] HalError),
}

// ─── Runner ─────────────────────────────────────────────────────────

/// Drives an [`AutochargeFsm`] from a [`SensorFeed`].
pub struct CycleRunner<F: SensorFeed> {
    fsm: AutochargeFsm,
    peripherals: Peripherals,
    feed: F,
    running: Arc<AtomicBool>,
    max_steps: Option<u64>,
    stats: CycleStats,
}

impl<F: SensorFeed> CycleRunner<F> {
    /// Runner stepping `fsm` while `running` is set.
    pub fn new(
        fsm: AutochargeFsm,
        peripherals: Peripherals,
        feed: F,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            fsm,
            peripherals,
            feed,
            running,
            max_steps: None,
            stats: CycleStats::new(),
        }
    }

    /// Stop after `steps` steps.
    pub fn with_max_steps(mut self, steps: Option<u64>) -> Self {
        self.max_steps = steps;
        self
    }

    /// The state machine.
    pub fn fsm(&self) -> &AutochargeFsm {
        &self.fsm
    }

    /// Statistics so far.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Configure the peripherals, then loop.
    ///
    /// # Errors
    /// Returns `CycleError::Startup` if peripheral setup fails. Once the loop
    /// runs it only ends on shutdown.
    pub fn run(&mut self) -> Result<CycleStats, CycleError> {
        self.fsm.startup(&mut self.peripherals)?;
        info!("Entering control loop in {}", self.fsm.state());

        while self.running.load(Ordering::SeqCst) {
            if self.max_steps.is_some_and(|max| self.stats.steps >= max) {
                info!("Step limit reached");
                break;
            }
            let Some(reading) = self.feed.wait_reading() else {
                info!("Ground feed closed");
                break;
            };

            let start = Instant::now();
            let outcome = self.fsm.step(&mut self.peripherals, &reading);
            self.stats.record(&outcome, start.elapsed().as_micros() as u64);

            if self.stats.steps % STATS_LOG_INTERVAL == 0 {
                debug!(
                    "Control loop: {} steps in {}, avg={}us, max={}us, escapes={}",
                    self.stats.steps,
                    outcome.state,
                    self.stats.avg_step_us(),
                    self.stats.max_step_us,
                    self.stats.escapes
                );
            }
        }

        self.peripherals.motion.stop();
        let s = &self.stats;
        info!(
            "Control loop stopped after {} steps: {} line acquisitions, {} charges, {} escapes, {} aborts, {} disengages, max step {}us",
            s.steps,
            s.entries_into(FsmState::FollowLine),
            s.entries_into(FsmState::Charge),
            s.escapes,
            s.aborts,
            s.disengages,
            s.max_step_us
        );
        Ok(self.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AutochargeConfig;
    use crate::state::machine::Transition;
    use crate::timebase::Timebase;
    use autodock_common::hal::types::GroundReading;
    use autodock_hal::drivers::mock::{MockRig, ScriptedFeed};

    fn runner(feed: ScriptedFeed) -> (CycleRunner<ScriptedFeed>, MockRig, Arc<AtomicBool>) {
        let rig = MockRig::new();
        let fsm = AutochargeFsm::new(&AutochargeConfig::default(), Timebase::new());
        let running = Arc::new(AtomicBool::new(true));
        let runner = CycleRunner::new(fsm, rig.peripherals(), feed, Arc::clone(&running));
        (runner, rig, running)
    }

    #[test]
    fn runs_until_feed_closes() {
        let (mut r, rig, _) = runner(ScriptedFeed::repeat(GroundReading::uniform(800), 25));
        let stats = r.run().unwrap();
        assert_eq!(stats.steps, 25);
        assert!(rig.avoidance.enabled());
        assert_eq!(rig.avoidance.calibrations(), 1);
        assert!(rig.vision.configured().is_some());
    }

    #[test]
    fn step_limit_stops_loop() {
        let (r, _rig, _) = runner(ScriptedFeed::repeat(GroundReading::uniform(800), 25));
        let mut r = r.with_max_steps(Some(10));
        assert_eq!(r.run().unwrap().steps, 10);
    }

    #[test]
    fn cleared_flag_skips_loop() {
        let (mut r, _rig, running) = runner(ScriptedFeed::repeat(GroundReading::uniform(800), 5));
        running.store(false, Ordering::SeqCst);
        assert_eq!(r.run().unwrap().steps, 0);
    }

    #[test]
    fn start_state_from_command_line_is_honored() {
        let rig = MockRig::new();
        let mut fsm = AutochargeFsm::new(&AutochargeConfig::default(), Timebase::new());
        fsm.resume("follow-line".parse().unwrap());
        let mut r = CycleRunner::new(
            fsm,
            rig.peripherals(),
            ScriptedFeed::repeat(GroundReading::uniform(560), 3),
            Arc::new(AtomicBool::new(true)),
        );
        let stats = r.run().unwrap();
        assert_eq!(r.fsm().state(), FsmState::FollowLine);
        assert_eq!(stats.steps, 3);
        assert!(!rig.avoidance.enabled());
        assert!(rig.vision.triggers() >= 3);
    }

    #[test]
    fn stats_count_transitions_and_maneuvers() {
        let mut stats = CycleStats::new();
        let outcome = StepOutcome {
            state: FsmState::Explore,
            transition: Some(Transition {
                from: FsmState::FollowLine,
                to: FsmState::Explore,
                cause: TransitionCause::EscapeAbort,
                timer: 0,
            }),
            escaped: true,
            correction: None,
        };
        stats.record(&outcome, 40);
        stats.record(
            &StepOutcome {
                transition: None,
                escaped: false,
                ..outcome
            },
            20,
        );
        assert_eq!(stats.steps, 2);
        assert_eq!(stats.escapes, 1);
        assert_eq!(stats.aborts, 1);
        assert_eq!(stats.entries_into(FsmState::Explore), 1);
        assert_eq!(stats.max_step_us, 40);
        assert_eq!(stats.avg_step_us(), 30);
    }

    #[test]
    fn bad_camera_config_fails_startup() {
        let rig = MockRig::new();
        let mut config = AutochargeConfig::default();
        config.camera.width = 0;
        let fsm = AutochargeFsm::new(&config, Timebase::new());
        let mut r = CycleRunner::new(
            fsm,
            rig.peripherals(),
            ScriptedFeed::default(),
            Arc::new(AtomicBool::new(true)),
        );
        assert!(matches!(r.run(), Err(CycleError::Startup(_))));
    }
}
