//! Line-centering law.
//!
//! Maps one ground reading to a pair of wheel speeds. Rules are checked in
//! order and the first match wins:
//!
//! 1. Channel 4 alone on the line: hard pivot left.
//! 2. Channel 3 alone on the line: hard pivot right.
//! 3. Channel 0 off and channel 2 on, no pending turn: proportional right turn.
//! 4. Channel 2 off and channel 0 on, no pending turn: proportional left turn.
//! 5. Otherwise drive straight.
//!
//! The proportional rules only fire when the previous tick did not turn, so
//! a drifting robot alternates one turn tick with one straight tick.

use autodock_common::consts::{
    FOLLOW_SPEED_BASE, FOLLOW_SPEED_MAX, FOLLOW_SPEED_MIN, GROUND_LINE_THRESHOLD, TURN_SPEED,
};
use autodock_common::hal::types::GroundReading;

/// Tuning of the centering law.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenteringParams {
    /// Line threshold on every channel.
    pub threshold: u16,
    /// Hard pivot speed.
    pub turn_speed: i16,
    /// Straight speed lower bound.
    pub speed_min: i16,
    /// Straight speed upper bound.
    pub speed_max: i16,
    /// Pending speed after a proportional turn is `speed_base - channel`.
    pub speed_base: u16,
}

impl Default for CenteringParams {
    fn default() -> Self {
        Self {
            threshold: GROUND_LINE_THRESHOLD,
            turn_speed: TURN_SPEED,
            speed_min: FOLLOW_SPEED_MIN,
            speed_max: FOLLOW_SPEED_MAX,
            speed_base: FOLLOW_SPEED_BASE,
        }
    }
}

/// Which rule produced a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Rule 1.
    PivotLeft,
    /// Rule 2.
    PivotRight,
    /// Rule 3.
    BearRight,
    /// Rule 4.
    BearLeft,
    /// Rule 5.
    Straight,
}

/// Wheel speeds chosen for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelCommand {
    /// Rule that fired.
    pub correction: Correction,
    /// Left wheel speed.
    pub left: i16,
    /// Right wheel speed.
    pub right: i16,
}

/// Centering memory carried between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CenteringState {
    /// The previous tick turned.
    pub direction_changed: bool,
    /// Pending straight speed.
    pub speed: i16,
}

/// Apply the centering law to `reading`, updating `state`.
pub fn centering_command(
    reading: &GroundReading,
    state: &mut CenteringState,
    p: &CenteringParams,
) -> WheelCommand {
    let thr = p.threshold;
    let on = |ch: usize| reading.channel(ch) < thr;
    let off = |ch: usize| reading.channel(ch) > thr;
    let cmd = |correction, left, right| WheelCommand {
        correction,
        left,
        right,
    };

    if on(4) && reading.all_above(&[0, 1, 2, 3], thr) {
        state.direction_changed = true;
        return cmd(Correction::PivotLeft, -p.turn_speed, p.turn_speed);
    }
    if on(3) && reading.all_above(&[0, 1, 2, 4], thr) {
        state.direction_changed = true;
        return cmd(Correction::PivotRight, p.turn_speed, -p.turn_speed);
    }
    if off(0) && on(2) && !state.direction_changed {
        let turn = half_excess(reading.channel(0), thr);
        state.direction_changed = true;
        state.speed = pending_speed(reading.channel(0), p.speed_base);
        return cmd(Correction::BearRight, turn, -turn);
    }
    if off(2) && on(0) && !state.direction_changed {
        let turn = half_excess(reading.channel(2), thr);
        state.direction_changed = true;
        state.speed = pending_speed(reading.channel(2), p.speed_base);
        return cmd(Correction::BearLeft, -turn, turn);
    }

    state.speed = if state.direction_changed {
        p.speed_max
    } else {
        clamp_speed(state.speed, p.speed_min, p.speed_max)
    };
    state.direction_changed = false;
    cmd(Correction::Straight, state.speed, state.speed)
}

/// Clamp a pending speed into `[min, max]`.
#[inline]
pub fn clamp_speed(speed: i16, min: i16, max: i16) -> i16 {
    speed.clamp(min, max)
}

fn half_excess(value: u16, threshold: u16) -> i16 {
    let turn = (i32::from(value) - i32::from(threshold)) / 2;
    turn.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn pending_speed(value: u16, base: u16) -> i16 {
    let speed = i32::from(base) - i32::from(value);
    speed.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
