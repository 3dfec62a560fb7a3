//! Autodock Common Library
//!
//! Shared types, peripheral traits and configuration loading used by every
//! crate in the autodock workspace.
//!
//! # Module Structure
//!
//! - [`bus`] - Latest-value publish/subscribe topics (sensor transport)
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Default thresholds, timings and maneuver magnitudes
//! - [`hal`] - Peripheral traits, driver errors and data types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use autodock_common::prelude::*;
//!
//! let reading = GroundReading::new([600, 600, 500, 600, 600]);
//! assert!(reading.any_below(550));
//! ```

pub mod bus;
pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
