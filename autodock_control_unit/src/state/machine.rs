//! Autocharge states and transition table.
//!
//! Explore → SearchLine → FollowLine ⇄ Charge, with recovery edges back to
//! Explore (search timeout, escape abort, charge complete) and from
//! FollowLine to SearchLine (line lost).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The four autocharge states. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FsmState {
    /// Wander with obstacle avoidance.
    #[default]
    Explore,
    /// Look for the guide line.
    SearchLine,
    /// Center on the line and drive towards the dock.
    FollowLine,
    /// Sit on the contacts.
    Charge,
}

impl FsmState {
    /// All states, in cycle order.
    pub const ALL: [FsmState; 4] = [
        FsmState::Explore,
        FsmState::SearchLine,
        FsmState::FollowLine,
        FsmState::Charge,
    ];

    /// Dense index for per-state tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            FsmState::Explore => 0,
            FsmState::SearchLine => 1,
            FsmState::FollowLine => 2,
            FsmState::Charge => 3,
        }
    }

    /// Whether `self → next` is an edge of the state machine.
    pub const fn can_transition_to(self, next: FsmState) -> bool {
        use FsmState::*;
        matches!(
            (self, next),
            (Explore, SearchLine)
                | (SearchLine, Explore)
                | (SearchLine, FollowLine)
                | (FollowLine, Explore)
                | (FollowLine, SearchLine)
                | (FollowLine, Charge)
                | (Charge, FollowLine)
                | (Charge, Explore)
        )
    }

    /// The per-state timer survives transitions out of this state.
    #[inline]
    pub const fn preserves_timer(self) -> bool {
        matches!(self, FsmState::Charge)
    }

    /// Short name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            FsmState::Explore => "Explore",
            FsmState::SearchLine => "SearchLine",
            FsmState::FollowLine => "FollowLine",
            FsmState::Charge => "Charge",
        }
    }
}

impl fmt::Display for FsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A state name that matches none of the four states.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown state '{0}', expected explore, search-line, follow-line or charge")]
pub struct UnknownState(pub String);

impl FromStr for FsmState {
    type Err = UnknownState;

    /// Case-insensitive; `-` and `_` are ignored, so `follow-line`,
    /// `follow_line` and `FollowLine` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "explore" => Ok(FsmState::Explore),
            "searchline" => Ok(FsmState::SearchLine),
            "followline" => Ok(FsmState::FollowLine),
            "charge" => Ok(FsmState::Charge),
            _ => Err(UnknownState(s.to_owned())),
        }
    }
}

/// Blink pattern at roughly 1 Hz: on during odd seconds.
#[inline]
pub const fn blink_on(seconds: u16) -> bool {
    seconds % 2 == 1
}

/// Why a transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    /// Explore duration elapsed.
    ExploreElapsed,
    /// SearchLine ran past its timeout.
    SearchTimeout,
    /// Debounced line detection.
    LineAcquired,
    /// Escape attempts exhausted.
    EscapeAbort,
    /// Debounced charge contact.
    ContactMade,
    /// Outer channels off the line long enough.
    LineLost,
    /// Contact brightness dropped below the hysteresis band.
    ContactLost,
    /// Charge duration elapsed.
    ChargeComplete,
}

/// A completed transition, as reported by a control step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Outgoing state.
    pub from: FsmState,
    /// Incoming state.
    pub to: FsmState,
    /// Trigger.
    pub cause: TransitionCause,
    /// Timer value when leaving `from`.
    pub timer: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use FsmState::*;

    #[test]
    fn initial_state_is_explore() {
        assert_eq!(FsmState::default(), Explore);
    }

    #[test]
    fn valid_edges() {
        assert!(Explore.can_transition_to(SearchLine));
        assert!(SearchLine.can_transition_to(FollowLine));
        assert!(SearchLine.can_transition_to(Explore));
        assert!(FollowLine.can_transition_to(Charge));
        assert!(FollowLine.can_transition_to(SearchLine));
        assert!(FollowLine.can_transition_to(Explore));
        assert!(Charge.can_transition_to(FollowLine));
        assert!(Charge.can_transition_to(Explore));
    }

    #[test]
    fn invalid_edges() {
        assert!(!Explore.can_transition_to(FollowLine));
        assert!(!Explore.can_transition_to(Charge));
        assert!(!SearchLine.can_transition_to(Charge));
        assert!(!Charge.can_transition_to(SearchLine));
        for s in FsmState::ALL {
            assert!(!s.can_transition_to(s), "self-loop on {s}");
        }
    }

    #[test]
    fn only_charge_preserves_timer() {
        let preserving: Vec<_> = FsmState::ALL
            .into_iter()
            .filter(|s| s.preserves_timer())
            .collect();
        assert_eq!(preserving, vec![Charge]);
    }

    #[test]
    fn blink_follows_parity() {
        assert!(!blink_on(0));
        assert!(blink_on(1));
        assert!(!blink_on(10));
        assert!(blink_on(0xFFFE - 1));
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("follow-line".parse::<FsmState>(), Ok(FollowLine));
        assert_eq!("search_line".parse::<FsmState>(), Ok(SearchLine));
        assert_eq!("Charge".parse::<FsmState>(), Ok(Charge));
        for s in FsmState::ALL {
            assert_eq!(s.name().parse::<FsmState>(), Ok(s));
        }
        assert_eq!(
            "docking".parse::<FsmState>(),
            Err(UnknownState("docking".into()))
        );
    }

    #[test]
    fn index_is_dense() {
        for (i, s) in FsmState::ALL.into_iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }
}
