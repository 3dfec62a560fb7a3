//! # Autodock Control Unit
//!
//! Autocharge behavior of a small differential-drive robot: wander, find the
//! guide line on the floor, follow it to the dock, charge, leave, repeat.
//!
//! ## States
//!
//! 1. **Explore**: obstacle avoidance wanders for a fixed time
//! 2. **SearchLine**: wait for a debounced ground reading on the line
//! 3. **FollowLine**: center on the line, escape when stuck, detect contact
//! 4. **Charge**: hold contact for a fixed time, then disengage
//!
//! ## Timing
//!
//! Every state limit is expressed in seconds of a shared [`timebase::Timebase`]
//! counter ticked by an independent thread. The control loop itself is paced
//! by ground readings: one step per reading.

pub mod config;
pub mod control;
pub mod cycle;
pub mod fsm;
pub mod maneuver;
pub mod state;
pub mod timebase;

pub use fsm::{AutochargeFsm, StepOutcome};
pub use state::machine::FsmState;
