//! Simulated robot, floor and dock.
//!
//! `SimWorld` integrates differential-drive kinematics, models the five
//! downward reflectance sensors over a floor carrying a dark guide line,
//! models the camera looking at the dock's charge indicator and runs the
//! wander/avoid behavior while it is enabled.

use autodock_common::consts::GROUND_CHANNELS;
use autodock_common::hal::types::{GroundReading, Indicators, Wheel};
use std::f64::consts::PI;
use tracing::{debug, trace};

use super::config::SimConfig;

/// Wheel radius [mm].
pub const WHEEL_RADIUS_MM: f64 = 20.5;
/// Encoder ticks per wheel revolution.
pub const TICKS_PER_REV: f64 = 1000.0;
/// Distance between the wheels [mm].
pub const AXLE_MM: f64 = 53.0;
/// Body radius [mm].
pub const BODY_RADIUS_MM: f64 = 37.0;

/// Ground sensor positions in the robot frame (forward, left) [mm].
///
/// 0 left, 1 center, 2 right of the front cluster; 3 right edge, 4 left edge.
pub const GROUND_SENSOR_POS: [(f64, f64); GROUND_CHANNELS] = [
    (30.0, 12.0),
    (30.0, 0.0),
    (30.0, -12.0),
    (24.0, -28.0),
    (24.0, 28.0),
];

/// Proximity reading at zero distance.
const PROXIMITY_PEAK: f64 = 4096.0;
/// Proximity decay length [mm].
const PROXIMITY_DECAY_MM: f64 = 20.0;

/// Millimetres travelled per encoder tick.
#[inline]
pub fn mm_per_tick() -> f64 {
    2.0 * PI * WHEEL_RADIUS_MM / TICKS_PER_REV
}

/// Planar pose.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// X [mm].
    pub x: f64,
    /// Y [mm].
    pub y: f64,
    /// Heading [rad].
    pub theta: f64,
}

impl Pose {
    /// Transform a point from the robot frame into the world frame.
    pub fn to_world(&self, forward: f64, left: f64) -> (f64, f64) {
        let (s, c) = self.theta.sin_cos();
        (
            self.x + forward * c - left * s,
            self.y + forward * s + left * c,
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Capture {
    /// Sim time at which the pending capture completes.
    due: Option<f64>,
    /// Brightness sampled by the last completed capture.
    value: u8,
    /// Completed captures.
    frames: u64,
}

/// Complete simulation state, shared by the physics loop and the peripherals.
#[derive(Debug)]
pub struct SimWorld {
    config: SimConfig,
    pose: Pose,
    time_s: f64,
    speed: [i16; 2],
    encoder: [f64; 2],
    avoidance: Option<u16>,
    indicators: Indicators,
    capture: Capture,
}

impl SimWorld {
    /// Build the world with the robot at the configured start pose.
    pub fn new(config: SimConfig) -> Self {
        let pose = Pose {
            x: config.start.x,
            y: config.start.y,
            theta: config.start.heading_deg.to_radians(),
        };
        Self {
            config,
            pose,
            time_s: 0.0,
            speed: [0; 2],
            encoder: [0.0; 2],
            avoidance: None,
            indicators: Indicators::empty(),
            capture: Capture::default(),
        }
    }

    /// Simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Place the robot.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Simulated time [s].
    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    // ─── Motors ─────────────────────────────────────────────────────

    /// Set one wheel speed [ticks/s].
    pub fn set_speed(&mut self, wheel: Wheel, speed: i16) {
        self.speed[wheel.index()] = speed;
    }

    /// Current wheel speed [ticks/s].
    pub fn speed(&self, wheel: Wheel) -> i16 {
        self.speed[wheel.index()]
    }

    /// Overwrite one encoder.
    pub fn set_encoder(&mut self, wheel: Wheel, position: i32) {
        self.encoder[wheel.index()] = position as f64;
    }

    /// Encoder position [ticks], truncated toward zero.
    pub fn encoder(&self, wheel: Wheel) -> i32 {
        self.encoder[wheel.index()] as i32
    }

    // ─── Avoidance ──────────────────────────────────────────────────

    /// Enable or disable the wander/avoid behavior.
    pub fn set_avoidance(&mut self, threshold: Option<u16>) {
        if self.avoidance.is_some() != threshold.is_some() {
            debug!("Obstacle avoidance {}", if threshold.is_some() { "enabled" } else { "disabled" });
        }
        self.avoidance = threshold;
    }

    /// Threshold of the wander/avoid behavior, `None` when disabled.
    pub fn avoidance(&self) -> Option<u16> {
        self.avoidance
    }

    // ─── Indicators ─────────────────────────────────────────────────

    /// Switch indicator lights on or off.
    pub fn set_indicators(&mut self, lights: Indicators, on: bool) {
        let before = self.indicators;
        self.indicators.set(lights, on);
        if before != self.indicators {
            trace!("Indicators {:?} -> {:?}", before, self.indicators);
        }
    }

    /// Lit indicators.
    pub fn indicators(&self) -> Indicators {
        self.indicators
    }

    // ─── Camera ─────────────────────────────────────────────────────

    /// Start a one-shot capture completing `latency_s` from now.
    pub fn trigger_capture(&mut self) {
        let latency_s = self.config.capture_latency_ms as f64 / 1000.0;
        self.capture.due = Some(self.time_s + latency_s);
    }

    /// `true` when no capture is pending and at least one frame exists.
    pub fn frame_ready(&self) -> bool {
        self.capture.due.is_none() && self.capture.frames > 0
    }

    /// Brightness of the last completed frame.
    pub fn frame_value(&self) -> u8 {
        self.capture.value
    }

    /// Completed capture count.
    pub fn frames(&self) -> u64 {
        self.capture.frames
    }

    /// Brightness the camera currently sees.
    pub fn brightness(&self) -> u8 {
        if self.in_contact() {
            self.config.dock_lit_brightness
        } else {
            self.config.ambient_brightness
        }
    }

    // ─── Geometry ───────────────────────────────────────────────────

    /// `true` while the front contacts touch the dock face.
    pub fn in_contact(&self) -> bool {
        let (fx, fy) = self.pose.to_world(BODY_RADIUS_MM, 0.0);
        let facing = self.pose.theta.cos() > 0.8;
        facing && (self.config.dock_x - fx) <= 2.0 && fy.abs() <= self.config.dock_half_width
    }

    fn on_line(&self, x: f64, y: f64) -> bool {
        x >= self.config.line_start_x
            && x <= self.config.dock_x
            && y.abs() <= self.config.line_width / 2.0
    }

    /// Sample the ground sensors at the current pose.
    pub fn ground_reading(&self) -> GroundReading {
        let mut delta = [0u16; GROUND_CHANNELS];
        for (value, &(fwd, left)) in delta.iter_mut().zip(GROUND_SENSOR_POS.iter()) {
            let (x, y) = self.pose.to_world(fwd, left);
            *value = if self.on_line(x, y) {
                self.config.line_reflectance
            } else {
                self.config.floor_reflectance
            };
        }
        GroundReading::new(delta)
    }

    /// Free distance ahead of the body along the heading [mm].
    pub fn free_distance(&self) -> f64 {
        let (s, c) = self.pose.theta.sin_cos();
        let half = self.config.arena_half_size;
        let mut t = f64::INFINITY;
        if c > 1e-9 {
            t = t.min((half - self.pose.x) / c);
        } else if c < -1e-9 {
            t = t.min((-half - self.pose.x) / c);
        }
        if s > 1e-9 {
            t = t.min((half - self.pose.y) / s);
        } else if s < -1e-9 {
            t = t.min((-half - self.pose.y) / s);
        }
        if c > 1e-9 && self.pose.x < self.config.dock_x {
            let td = (self.config.dock_x - self.pose.x) / c;
            if (self.pose.y + s * td).abs() <= self.config.dock_half_width {
                t = t.min(td);
            }
        }
        (t - BODY_RADIUS_MM).max(0.0)
    }

    /// Front proximity reading, growing as obstacles get closer.
    pub fn proximity(&self) -> u16 {
        let d = self.free_distance();
        (PROXIMITY_PEAK * (-d / PROXIMITY_DECAY_MM).exp()) as u16
    }

    // ─── Integration ────────────────────────────────────────────────

    /// Advance the simulation by `dt_s` seconds.
    pub fn advance(&mut self, dt_s: f64) {
        self.time_s += dt_s;

        if let Some(threshold) = self.avoidance {
            self.run_avoidance(threshold);
        }

        let k = mm_per_tick();
        let vl = self.speed[0] as f64 * k;
        let vr = self.speed[1] as f64 * k;
        let v = (vl + vr) / 2.0;
        let omega = (vr - vl) / AXLE_MM;

        self.pose.theta = normalize_angle(self.pose.theta + omega * dt_s);
        self.pose.x += v * self.pose.theta.cos() * dt_s;
        self.pose.y += v * self.pose.theta.sin() * dt_s;
        self.constrain();

        self.encoder[0] += self.speed[0] as f64 * dt_s;
        self.encoder[1] += self.speed[1] as f64 * dt_s;

        if let Some(due) = self.capture.due {
            if self.time_s >= due {
                self.capture.due = None;
                self.capture.value = self.brightness();
                self.capture.frames += 1;
            }
        }
    }

    fn run_avoidance(&mut self, threshold: u16) {
        let cruise = self.config.cruise_speed;
        if self.proximity() > threshold {
            self.speed = [-cruise / 2, cruise / 2];
        } else {
            self.speed = [cruise, cruise];
        }
    }

    fn constrain(&mut self) {
        let limit = self.config.arena_half_size - BODY_RADIUS_MM;
        self.pose.x = self.pose.x.clamp(-limit, limit);
        self.pose.y = self.pose.y.clamp(-limit, limit);

        let dock_stop = self.config.dock_x - BODY_RADIUS_MM;
        if self.pose.x > dock_stop && self.pose.y.abs() <= self.config.dock_half_width {
            self.pose.x = dock_stop;
        }
    }
}

/// Wrap an angle into (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a <= -PI {
        a += 2.0 * PI;
    }
    a
}
