//! State machine module root.
//!
//! - [`machine`] - The four autocharge states and their transition table
//! - [`context`] - Debounce counters, flags and the reset applied on transitions

pub mod context;
pub mod machine;
