//! Mock drivers for testing.
//!
//! Every mock keeps its observable state behind an `Arc<Mutex<_>>` so a test
//! can hand the driver to the control loop as a trait object and still
//! inspect or script it through the matching handle.
//!
//! ```rust
//! use autodock_hal::drivers::mock::MockRig;
//!
//! let rig = MockRig::new();
//! rig.vision.set_brightness(200);
//! let mut peripherals = rig.peripherals();
//! peripherals.vision.trigger_capture();
//! assert_eq!(rig.vision.triggers(), 1);
//! ```

use autodock_common::hal::driver::{
    HalError, IndicatorLights, MotionController, ObstacleAvoidance, Peripherals, SensorFeed,
    Vision,
};
use autodock_common::hal::types::{CameraConfig, GroundReading, Indicators, Wheel};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

// ─── Motion ─────────────────────────────────────────────────────────

/// A motor command observed by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    /// `set_speed(wheel, speed)`.
    Speed(Wheel, i16),
    /// `set_position(wheel, position)`.
    Position(Wheel, i32),
}

#[derive(Debug)]
struct MotionState {
    speed: [i16; 2],
    position: [i32; 2],
    events: Vec<MotionEvent>,
    recording: bool,
    polls: u64,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            speed: [0; 2],
            position: [0; 2],
            events: Vec::new(),
            recording: true,
            polls: 0,
        }
    }
}

impl MotionState {
    fn log(&mut self, event: MotionEvent) {
        if self.recording {
            self.events.push(event);
        }
    }
}

/// Wheels whose encoders advance only while a maneuver polls.
///
/// Each `wait_poll()` moves every turning wheel by `ticks_per_poll` in the
/// direction of its speed.
pub struct MockMotion {
    state: Arc<Mutex<MotionState>>,
    ticks_per_poll: i32,
}

impl MotionController for MockMotion {
    fn set_speed(&mut self, wheel: Wheel, speed: i16) {
        let mut s = self.state.lock();
        s.speed[wheel.index()] = speed;
        s.log(MotionEvent::Speed(wheel, speed));
    }

    fn set_position(&mut self, wheel: Wheel, position: i32) {
        let mut s = self.state.lock();
        s.position[wheel.index()] = position;
        s.log(MotionEvent::Position(wheel, position));
    }

    fn position(&self, wheel: Wheel) -> i32 {
        self.state.lock().position[wheel.index()]
    }

    fn speed(&self, wheel: Wheel) -> i16 {
        self.state.lock().speed[wheel.index()]
    }

    fn wait_poll(&mut self) {
        let mut s = self.state.lock();
        s.polls += 1;
        for i in 0..2 {
            s.position[i] += s.speed[i].signum() as i32 * self.ticks_per_poll;
        }
    }
}

/// Inspection handle for [`MockMotion`].
#[derive(Clone, Default)]
pub struct MotionHandle {
    state: Arc<Mutex<MotionState>>,
}

impl MotionHandle {
    /// Current `(left, right)` speeds.
    pub fn speeds(&self) -> (i16, i16) {
        let s = self.state.lock();
        (s.speed[0], s.speed[1])
    }

    /// Current encoder position of one wheel.
    pub fn position(&self, wheel: Wheel) -> i32 {
        self.state.lock().position[wheel.index()]
    }

    /// Every command seen so far.
    pub fn events(&self) -> Vec<MotionEvent> {
        self.state.lock().events.clone()
    }

    /// Forget recorded commands.
    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// Turn command recording on or off (on by default).
    pub fn set_recording(&self, on: bool) {
        self.state.lock().recording = on;
    }

    /// Number of encoder polls performed by blocking maneuvers.
    pub fn polls(&self) -> u64 {
        self.state.lock().polls
    }

    /// Wheels whose encoder was zeroed, in order. One entry per maneuver leg.
    pub fn position_resets(&self) -> Vec<Wheel> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MotionEvent::Position(w, 0) => Some(*w),
                _ => None,
            })
            .collect()
    }
}

// ─── Vision ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct VisionState {
    brightness: u8,
    pending: bool,
    has_frame: bool,
    triggers: u64,
    waits: u64,
    configured: Option<CameraConfig>,
}

/// Camera returning a scripted brightness.
///
/// A capture completes in `wait_frame_ready()`, sampling the brightness set
/// at that moment.
pub struct MockVision {
    state: Arc<Mutex<VisionState>>,
    frame: Vec<u8>,
}

impl Vision for MockVision {
    fn configure(&mut self, config: &CameraConfig) -> Result<(), HalError> {
        config.validate().map_err(HalError::ConfigError)?;
        self.state.lock().configured = Some(*config);
        self.frame = vec![0; config.frame_len()];
        Ok(())
    }

    fn trigger_capture(&mut self) {
        let mut s = self.state.lock();
        s.pending = true;
        s.triggers += 1;
    }

    fn is_frame_ready(&self) -> bool {
        let s = self.state.lock();
        s.has_frame && !s.pending
    }

    fn wait_frame_ready(&mut self) {
        let mut s = self.state.lock();
        s.waits += 1;
        s.pending = false;
        s.has_frame = true;
        let value = s.brightness;
        drop(s);
        if self.frame.is_empty() {
            self.frame.push(value);
        } else {
            self.frame.fill(value);
        }
    }

    fn last_frame(&mut self) -> &[u8] {
        &self.frame
    }
}

/// Scripting handle for [`MockVision`].
#[derive(Clone, Default)]
pub struct VisionHandle {
    state: Arc<Mutex<VisionState>>,
}

impl VisionHandle {
    /// Brightness the next completed capture will see.
    pub fn set_brightness(&self, value: u8) {
        self.state.lock().brightness = value;
    }

    /// Captures triggered so far.
    pub fn triggers(&self) -> u64 {
        self.state.lock().triggers
    }

    /// Blocking readiness waits so far.
    pub fn waits(&self) -> u64 {
        self.state.lock().waits
    }

    /// Configuration applied by `configure()`, if any.
    pub fn configured(&self) -> Option<CameraConfig> {
        self.state.lock().configured
    }
}

// ─── Indicators ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct IndicatorState {
    lit: Indicators,
    clears: u64,
}

/// Status lights stored as bitflags.
pub struct MockIndicators {
    state: Arc<Mutex<IndicatorState>>,
}

impl IndicatorLights for MockIndicators {
    fn set_body(&mut self, on: bool) {
        self.state.lock().lit.set(Indicators::BODY, on);
    }

    fn set_front(&mut self, on: bool) {
        self.state.lock().lit.set(Indicators::FRONT, on);
    }

    fn clear_all(&mut self) {
        let mut s = self.state.lock();
        s.lit = Indicators::empty();
        s.clears += 1;
    }
}

/// Inspection handle for [`MockIndicators`].
#[derive(Clone, Default)]
pub struct IndicatorHandle {
    state: Arc<Mutex<IndicatorState>>,
}

impl IndicatorHandle {
    /// Lit indicators.
    pub fn lit(&self) -> Indicators {
        self.state.lock().lit
    }

    /// `clear_all()` calls so far.
    pub fn clears(&self) -> u64 {
        self.state.lock().clears
    }
}

// ─── Avoidance ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct AvoidanceState {
    enabled: bool,
    threshold: u16,
    calibrations: u64,
}

/// Avoidance switch recording its last setting.
pub struct MockAvoidance {
    state: Arc<Mutex<AvoidanceState>>,
}

impl ObstacleAvoidance for MockAvoidance {
    fn calibrate(&mut self) {
        self.state.lock().calibrations += 1;
    }

    fn enable(&mut self, threshold: u16) {
        let mut s = self.state.lock();
        s.enabled = true;
        s.threshold = threshold;
    }

    fn disable(&mut self) {
        self.state.lock().enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }
}

/// Inspection handle for [`MockAvoidance`].
#[derive(Clone, Default)]
pub struct AvoidanceHandle {
    state: Arc<Mutex<AvoidanceState>>,
}

impl AvoidanceHandle {
    /// Whether avoidance is enabled.
    pub fn enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Threshold passed to the last `enable()`.
    pub fn threshold(&self) -> u16 {
        self.state.lock().threshold
    }

    /// `calibrate()` calls so far.
    pub fn calibrations(&self) -> u64 {
        self.state.lock().calibrations
    }
}

// ─── Feed ───────────────────────────────────────────────────────────

/// Sensor feed replaying a fixed list of readings, then reporting shutdown.
#[derive(Debug, Default)]
pub struct ScriptedFeed {
    readings: VecDeque<GroundReading>,
}

impl ScriptedFeed {
    /// Feed delivering `readings` in order.
    pub fn new(readings: impl IntoIterator<Item = GroundReading>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    /// Feed delivering `reading` `count` times.
    pub fn repeat(reading: GroundReading, count: usize) -> Self {
        Self::new(std::iter::repeat_n(reading, count))
    }

    /// Readings not yet delivered.
    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl SensorFeed for ScriptedFeed {
    fn wait_reading(&mut self) -> Option<GroundReading> {
        self.readings.pop_front()
    }
}

// ─── Rig ────────────────────────────────────────────────────────────

/// Handles to one full set of mock peripherals.
#[derive(Clone, Default)]
pub struct MockRig {
    /// Motor handle.
    pub motion: MotionHandle,
    /// Camera handle.
    pub vision: VisionHandle,
    /// Lights handle.
    pub indicators: IndicatorHandle,
    /// Avoidance handle.
    pub avoidance: AvoidanceHandle,
    ticks_per_poll: i32,
}

impl MockRig {
    /// Encoder ticks advanced per maneuver poll by default.
    pub const DEFAULT_TICKS_PER_POLL: i32 = 5;

    /// New rig with dark camera, stopped wheels and everything off.
    pub fn new() -> Self {
        Self {
            ticks_per_poll: Self::DEFAULT_TICKS_PER_POLL,
            ..Self::default()
        }
    }

    /// Boxed peripherals sharing state with this rig's handles.
    pub fn peripherals(&self) -> Peripherals {
        Peripherals::new(
            Box::new(MockMotion {
                state: Arc::clone(&self.motion.state),
                ticks_per_poll: self.ticks_per_poll.max(1),
            }),
            Box::new(MockVision {
                state: Arc::clone(&self.vision.state),
                frame: Vec::new(),
            }),
            Box::new(MockIndicators {
                state: Arc::clone(&self.indicators.state),
            }),
            Box::new(MockAvoidance {
                state: Arc::clone(&self.avoidance.state),
            }),
        )
    }
}
