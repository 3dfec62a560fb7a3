//! Autocharge state machine.
//!
//! `AutochargeFsm` owns the state, the working counters and a handle to the
//! elapsed-seconds counter. `step()` runs once per ground reading: it issues
//! the state's actuator commands, may block on the camera or on an encoder
//! maneuver, and performs at most one transition.
//!
//! Every transition resets the working counters and, unless the outgoing
//! state is Charge, the timer. Charge keeps its timer so a brief contact loss
//! bouncing through FollowLine cannot extend the charge.

use autodock_common::consts::OUT_OF_LINE_SENTINEL;
use autodock_common::hal::driver::{HalError, Peripherals, Vision};
use autodock_common::hal::types::{CameraConfig, GroundReading, Wheel};
use tracing::{debug, info, trace, warn};

use crate::config::{AutochargeConfig, ThresholdConfig, TimingConfig};
use crate::control::line_follow::{
    CenteringParams, CenteringState, Correction, centering_command,
};
use crate::maneuver::{self, ManeuverParams};
use crate::state::context::{WorkingState, debounce};
use crate::state::machine::{FsmState, Transition, TransitionCause, blink_on};
use crate::timebase::Timebase;

/// Outer channels whose simultaneous brightness means the line is lost.
const OUTER_CHANNELS: [usize; 3] = [0, 1, 2];

/// What one control step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// State after the step.
    pub state: FsmState,
    /// Transition performed, if any.
    pub transition: Option<Transition>,
    /// An escape pivot was performed.
    pub escaped: bool,
    /// Centering rule applied (FollowLine steps that reached the control law).
    pub correction: Option<Correction>,
}

/// The autocharge control core.
#[derive(Debug)]
pub struct AutochargeFsm {
    state: FsmState,
    work: WorkingState,
    timebase: Timebase,
    thresholds: ThresholdConfig,
    timing: TimingConfig,
    avoidance_threshold: u16,
    centering: CenteringParams,
    maneuvers: ManeuverParams,
    camera: CameraConfig,
}

impl AutochargeFsm {
    /// Machine in Explore, reading time from `timebase`.
    pub fn new(config: &AutochargeConfig, timebase: Timebase) -> Self {
        Self {
            state: FsmState::Explore,
            work: WorkingState::default(),
            timebase,
            thresholds: config.thresholds,
            timing: config.timing,
            avoidance_threshold: config.avoidance.threshold,
            centering: config.centering(),
            maneuvers: config.maneuvers(),
            camera: config.camera,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> FsmState {
        self.state
    }

    /// Working counters and flags.
    #[inline]
    pub fn working(&self) -> &WorkingState {
        &self.work
    }

    /// Shared seconds counter.
    pub fn timebase(&self) -> &Timebase {
        &self.timebase
    }

    /// Wheel the next escape backs off first.
    pub fn next_escape_wheel(&self) -> Wheel {
        self.work.escape_first
    }

    /// Place the machine in `state` with cleared counters and timer.
    ///
    /// Used by `autodock --start-state` when commissioning a robot already
    /// sitting on the line or dock.
    pub fn resume(&mut self, state: FsmState) {
        info!("Resuming in {}", state);
        self.state = state;
        self.work.reset();
        self.timebase.reset();
    }

    /// One-time peripheral setup before the first step.
    ///
    /// # Errors
    /// Returns the driver error if the camera rejects the configuration.
    pub fn startup(&mut self, p: &mut Peripherals) -> Result<(), HalError> {
        p.indicators.clear_all();
        p.indicators.set_body(false);
        p.indicators.set_front(false);
        p.vision.configure(&self.camera)?;
        p.avoidance.calibrate();
        self.timebase.reset();
        info!(
            "Autocharge ready in {} (avoidance threshold {})",
            self.state, self.avoidance_threshold
        );
        Ok(())
    }

    /// Run one control step for `reading`.
    pub fn step(&mut self, p: &mut Peripherals, reading: &GroundReading) -> StepOutcome {
        let now = self.timebase.seconds();
        trace!(state = %self.state, timer = now, delta = ?reading.delta, "step");

        let mut outcome = StepOutcome {
            state: self.state,
            transition: None,
            escaped: false,
            correction: None,
        };
        match self.state {
            FsmState::Explore => self.explore(p, now, &mut outcome),
            FsmState::SearchLine => self.search_line(p, reading, now, &mut outcome),
            FsmState::FollowLine => self.follow_line(p, reading, now, &mut outcome),
            FsmState::Charge => self.charge(p, now, &mut outcome),
        }
        outcome.state = self.state;
        outcome
    }

    // ─── States ─────────────────────────────────────────────────────

    fn explore(&mut self, p: &mut Peripherals, now: u16, out: &mut StepOutcome) {
        p.avoidance.enable(self.avoidance_threshold);
        p.indicators.set_body(false);
        p.indicators.set_front(false);

        if now >= self.timing.explore_s {
            out.transition =
                Some(self.transition(FsmState::SearchLine, TransitionCause::ExploreElapsed));
            return;
        }

        if now % self.timing.explore_bookkeeping_s == 0 && self.work.last_timer_count != now {
            self.work.last_timer_count = now;
            debug!("Exploring for {}s", now);
        }
    }

    fn search_line(
        &mut self,
        p: &mut Peripherals,
        reading: &GroundReading,
        now: u16,
        out: &mut StepOutcome,
    ) {
        p.indicators.set_body(false);
        p.indicators.set_front(blink_on(now));

        if now > self.timing.search_timeout_s {
            out.transition =
                Some(self.transition(FsmState::Explore, TransitionCause::SearchTimeout));
            return;
        }

        if self.work.out_of_line > 0 {
            self.work.out_of_line -= 1;
            return;
        }

        let on_line = reading.any_below(self.thresholds.line);
        if debounce(&mut self.work.line_found, on_line, self.thresholds.debounce) {
            p.vision.trigger_capture();
            out.transition =
                Some(self.transition(FsmState::FollowLine, TransitionCause::LineAcquired));
        }
    }

    fn follow_line(
        &mut self,
        p: &mut Peripherals,
        reading: &GroundReading,
        now: u16,
        out: &mut StepOutcome,
    ) {
        p.avoidance.disable();
        p.indicators.set_front(false);
        p.indicators.set_body(blink_on(now));

        if now > self.timing.follow_stuck_s {
            let first = self.work.escape_first;
            self.work.escape_attempts += 1;
            warn!(
                "No progress for {}s on the line, escape #{} ({:?} wheel first)",
                now, self.work.escape_attempts, first
            );
            maneuver::escape_pivot(p.motion.as_mut(), first, &self.maneuvers);
            self.timebase.reset();
            self.work.escape_first = first.opposite();
            out.escaped = true;
        }

        if self.work.escape_attempts >= self.timing.max_escape_attempts {
            warn!(
                "Escape failed {} times, reversing and returning to Explore",
                self.work.escape_attempts
            );
            maneuver::reverse(p.motion.as_mut(), &self.maneuvers);
            out.transition = Some(self.transition(FsmState::Explore, TransitionCause::EscapeAbort));
            return;
        }

        let lit = fresh_brightness(p.vision.as_mut()) > self.thresholds.contact_made;
        if debounce(&mut self.work.charge_contact, lit, self.thresholds.debounce) {
            p.motion.stop();
            p.vision.trigger_capture();
            out.transition = Some(self.transition(FsmState::Charge, TransitionCause::ContactMade));
            return;
        }

        if reading.all_above(&OUTER_CHANNELS, self.thresholds.off_line) {
            self.work.out_of_line += 1;
            if self.work.out_of_line > u32::from(self.thresholds.debounce) {
                out.transition =
                    Some(self.transition(FsmState::SearchLine, TransitionCause::LineLost));
                self.work.out_of_line = OUT_OF_LINE_SENTINEL;
                return;
            }
        } else {
            self.work.out_of_line = 0;
        }

        p.vision.trigger_capture();

        let mut centering = CenteringState {
            direction_changed: self.work.direction_changed,
            speed: self.work.line_follow_speed,
        };
        let cmd = centering_command(reading, &mut centering, &self.centering);
        self.work.direction_changed = centering.direction_changed;
        self.work.line_follow_speed = centering.speed;
        p.motion.set_speeds(cmd.left, cmd.right);
        out.correction = Some(cmd.correction);
    }

    fn charge(&mut self, p: &mut Peripherals, now: u16, out: &mut StepOutcome) {
        p.indicators.set_body(false);
        p.indicators.set_front(false);
        p.indicators.clear_all();

        let brightness = fresh_brightness(p.vision.as_mut());
        if brightness < self.thresholds.contact_lost {
            debug!("Contact lost (brightness {})", brightness);
            p.vision.trigger_capture();
            out.transition =
                Some(self.transition(FsmState::FollowLine, TransitionCause::ContactLost));
            return;
        }

        p.vision.trigger_capture();

        if now > self.timing.charge_s {
            let side = self.work.return_side.opposite();
            self.work.return_side = side;
            warn!("Charged for {}s, leaving the dock ({:?} wheel pivot)", now, side);
            maneuver::disengage(p.motion.as_mut(), side, &self.maneuvers);
            out.transition =
                Some(self.transition(FsmState::Explore, TransitionCause::ChargeComplete));
            self.timebase.reset();
        }
    }

    // ─── Transitions ────────────────────────────────────────────────

    fn transition(&mut self, to: FsmState, cause: TransitionCause) -> Transition {
        let from = self.state;
        debug_assert!(from.can_transition_to(to), "invalid transition {from} -> {to}");
        let timer = self.timebase.seconds();
        if !from.preserves_timer() {
            self.timebase.reset();
        }
        self.work.reset();
        self.state = to;
        info!("{} -> {} ({:?}, timer={}s)", from, to, cause, timer);
        Transition {
            from,
            to,
            cause,
            timer,
        }
    }
}

/// Block until a frame is available and read its representative sample.
///
/// An empty frame reads as 0.
fn fresh_brightness(vision: &mut dyn Vision) -> u8 {
    if !vision.is_frame_ready() {
        vision.wait_frame_ready();
    }
    vision.last_frame().first().copied().unwrap_or(0)
}
