//! Working counters and flags carried between control steps.

use autodock_common::hal::types::Wheel;

/// Debounce counters, centering state and maneuver alternation flags.
///
/// `reset()` runs on every transition. The two alternation flags survive it
/// so escape direction and return side keep alternating across sojourns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingState {
    /// Consecutive readings with a channel on the line (SearchLine).
    pub line_found: u16,
    /// Consecutive off-line readings (FollowLine), or the grace countdown
    /// consumed by SearchLine after the line was lost.
    pub out_of_line: u32,
    /// Consecutive bright contact samples (FollowLine).
    pub charge_contact: u16,
    /// Escape pivots performed in the current FollowLine sojourn.
    pub escape_attempts: u8,
    /// A turn happened on the previous tick.
    pub direction_changed: bool,
    /// Pending straight-line speed.
    pub line_follow_speed: i16,
    /// Last Explore bookkeeping boundary.
    pub last_timer_count: u16,
    /// Wheel pivoted first by the next escape.
    pub escape_first: Wheel,
    /// Wheel pivoted by the last disengage.
    pub return_side: Wheel,
}

impl Default for WorkingState {
    fn default() -> Self {
        Self {
            line_found: 0,
            out_of_line: 0,
            charge_contact: 0,
            escape_attempts: 0,
            direction_changed: false,
            line_follow_speed: 0,
            last_timer_count: 0,
            escape_first: Wheel::Left,
            return_side: Wheel::Right,
        }
    }
}

impl WorkingState {
    /// Clear counters and centering state.
    pub fn reset(&mut self) {
        *self = Self {
            escape_first: self.escape_first,
            return_side: self.return_side,
            ..Self::default()
        };
    }
}

/// Consecutive-sample debounce.
///
/// A qualifying sample increments `counter` and reports `true` once it
/// exceeds `limit`; any other sample clears it.
#[inline]
pub fn debounce(counter: &mut u16, qualifying: bool, limit: u16) -> bool {
    if qualifying {
        *counter = counter.saturating_add(1);
        *counter > limit
    } else {
        *counter = 0;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_alternation_flags() {
        let mut w = WorkingState {
            line_found: 4,
            out_of_line: 10_000,
            charge_contact: 7,
            escape_attempts: 2,
            direction_changed: true,
            line_follow_speed: 220,
            last_timer_count: 10,
            escape_first: Wheel::Right,
            return_side: Wheel::Left,
        };
        w.reset();
        assert_eq!(
            w,
            WorkingState {
                escape_first: Wheel::Right,
                return_side: Wheel::Left,
                ..WorkingState::default()
            }
        );
    }

    #[test]
    fn debounce_fires_on_eleventh_sample() {
        let mut c = 0;
        for _ in 0..10 {
            assert!(!debounce(&mut c, true, 10));
        }
        assert!(debounce(&mut c, true, 10));
    }

    #[test]
    fn debounce_requires_consecutive_samples() {
        let mut c = 0;
        for _ in 0..10 {
            debounce(&mut c, true, 10);
        }
        assert!(!debounce(&mut c, false, 10));
        assert_eq!(c, 0);
        assert!(!debounce(&mut c, true, 10));
    }
}
