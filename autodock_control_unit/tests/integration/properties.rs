//! Property tests for the centering law.

use autodock_common::hal::types::GroundReading;
use autodock_control_unit::control::line_follow::{
    CenteringParams, CenteringState, Correction, centering_command, clamp_speed,
};
use proptest::prelude::*;

fn reading() -> impl Strategy<Value = GroundReading> {
    prop::array::uniform5(0u16..1100).prop_map(GroundReading::new)
}

proptest! {
    #[test]
    fn clamp_stays_in_range(speed in any::<i16>()) {
        let s = clamp_speed(speed, 100, 300);
        prop_assert!((100..=300).contains(&s));
    }

    #[test]
    fn straight_speed_bounded_after_any_history(
        history in prop::collection::vec(reading(), 1..60),
    ) {
        let params = CenteringParams::default();
        let mut state = CenteringState::default();
        let mut turned = false;
        for r in &history {
            let was_turning = state.direction_changed;
            let cmd = centering_command(r, &mut state, &params);
            match cmd.correction {
                Correction::Straight => {
                    prop_assert_eq!(cmd.left, cmd.right);
                    if turned {
                        prop_assert!((100..=300).contains(&cmd.left));
                    }
                    if was_turning {
                        prop_assert_eq!(cmd.left, 300);
                    }
                    prop_assert!(!state.direction_changed);
                }
                _ => {
                    turned = true;
                    prop_assert!(state.direction_changed);
                }
            }
        }
    }

    #[test]
    fn turns_are_symmetric(r in reading()) {
        let mut state = CenteringState::default();
        let cmd = centering_command(&r, &mut state, &CenteringParams::default());
        if cmd.correction != Correction::Straight {
            prop_assert_eq!(cmd.left, -cmd.right);
        }
    }
}
