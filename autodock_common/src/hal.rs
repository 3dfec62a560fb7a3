//! Hardware abstraction layer traits and data types.
//!
//! The autocharge core only talks to peripherals through the traits in
//! [`driver`]; concrete implementations live in the `autodock_hal` crate.

pub mod driver;
pub mod types;
