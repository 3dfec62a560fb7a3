//! Open-loop encoder maneuvers.
//!
//! Each maneuver zeroes the encoder of the wheel it measures, sets the wheel
//! speeds and blocks until the encoder crosses the target. The control step
//! does not proceed until the robot has physically moved.

use autodock_common::consts::{
    DISENGAGE_PIVOT_TICKS, ESCAPE_SPEED, ESCAPE_TICKS, REVERSE_SPEED, REVERSE_TICKS, TURN_SPEED,
};
use autodock_common::hal::driver::MotionController;
use autodock_common::hal::types::Wheel;
use tracing::trace;

/// Speeds [ticks/s] and distances [ticks] of the maneuvers. All positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManeuverParams {
    /// Escape pivot speed.
    pub escape_speed: i16,
    /// Escape pivot distance per wheel.
    pub escape_ticks: i32,
    /// Reverse speed.
    pub reverse_speed: i16,
    /// Reverse distance, measured on the left wheel.
    pub reverse_ticks: i32,
    /// Disengage pivot speed.
    pub pivot_speed: i16,
    /// Disengage pivot distance.
    pub pivot_ticks: i32,
}

impl Default for ManeuverParams {
    fn default() -> Self {
        Self {
            escape_speed: ESCAPE_SPEED,
            escape_ticks: ESCAPE_TICKS,
            reverse_speed: REVERSE_SPEED,
            reverse_ticks: REVERSE_TICKS,
            pivot_speed: TURN_SPEED,
            pivot_ticks: DISENGAGE_PIVOT_TICKS,
        }
    }
}

/// Poll `wheel` until its position reaches `target`.
///
/// Negative targets complete at `position <= target`, others at
/// `position >= target`. Returns the number of polls.
pub fn drive_until(motion: &mut dyn MotionController, wheel: Wheel, target: i32) -> u64 {
    let reached = |pos: i32| {
        if target < 0 {
            pos <= target
        } else {
            pos >= target
        }
    };
    let mut polls = 0;
    while !reached(motion.position(wheel)) {
        motion.wait_poll();
        polls += 1;
    }
    trace!("{:?} reached {} after {} polls", wheel, target, polls);
    polls
}

fn back_off(motion: &mut dyn MotionController, wheel: Wheel, p: &ManeuverParams) {
    motion.set_position(wheel, 0);
    motion.set_speed(wheel, -p.escape_speed);
    motion.set_speed(wheel.opposite(), 0);
    drive_until(motion, wheel, -p.escape_ticks);
}

/// Back off one wheel then the other, starting with `first`.
pub fn escape_pivot(motion: &mut dyn MotionController, first: Wheel, p: &ManeuverParams) {
    back_off(motion, first, p);
    back_off(motion, first.opposite(), p);
}

/// Reverse on both wheels until the left one has covered `reverse_ticks`.
pub fn reverse(motion: &mut dyn MotionController, p: &ManeuverParams) {
    motion.set_position(Wheel::Left, 0);
    motion.set_speeds(-p.reverse_speed, -p.reverse_speed);
    drive_until(motion, Wheel::Left, -p.reverse_ticks);
}

/// Leave the dock: reverse, then pivot forward on `side`.
pub fn disengage(motion: &mut dyn MotionController, side: Wheel, p: &ManeuverParams) {
    reverse(motion, p);
    motion.set_position(side, 0);
    motion.set_speed(side.opposite(), 0);
    motion.set_speed(side, p.pivot_speed);
    drive_until(motion, side, p.pivot_ticks);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encoders advance by `speed / 10` per poll.
    #[derive(Default)]
    struct Wheels {
        speed: [i16; 2],
        pos: [i32; 2],
        log: Vec<(Wheel, i16)>,
    }

    impl MotionController for Wheels {
        fn set_speed(&mut self, wheel: Wheel, speed: i16) {
            self.speed[wheel.index()] = speed;
            self.log.push((wheel, speed));
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

        fn wait_poll(&mut self) {
            for i in 0..2 {
                self.pos[i] += self.speed[i] as i32 / 10;
            }
        }
    }

    #[test]
    fn drive_until_negative_and_positive_targets() {
        let mut w = Wheels::default();
        w.set_speed(Wheel::Left, -150);
        assert_eq!(drive_until(&mut w, Wheel::Left, -75), 5);
        w.set_position(Wheel::Right, 0);
        w.set_speed(Wheel::Right, 300);
        assert_eq!(drive_until(&mut w, Wheel::Right, 250), 9);
        assert!(w.position(Wheel::Right) >= 250);
    }

    #[test]
    fn drive_until_already_reached_does_not_poll() {
        let mut w = Wheels::default();
        w.set_position(Wheel::Left, -300);
        assert_eq!(drive_until(&mut w, Wheel::Left, -250), 0);
    }

    #[test]
    fn escape_order_follows_first_wheel() {
        let mut w = Wheels::default();
        escape_pivot(&mut w, Wheel::Right, &ManeuverParams::default());
        assert_eq!(
            w.log,
            vec![
                (Wheel::Right, -150),
                (Wheel::Left, 0),
                (Wheel::Left, -150),
                (Wheel::Right, 0),
            ]
        );
        assert!(w.position(Wheel::Left) <= -75);
        assert!(w.position(Wheel::Right) <= -75);
    }

    #[test]
    fn disengage_reverses_then_pivots_one_wheel() {
        let mut w = Wheels::default();
        disengage(&mut w, Wheel::Left, &ManeuverParams::default());
        assert_eq!(w.speed, [300, 0]);
        assert!(w.position(Wheel::Left) >= 250);
        assert!(w.log.contains(&(Wheel::Right, -300)));
    }
}
