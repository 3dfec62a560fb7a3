//! # Autodock HAL Library
//!
//! Peripheral drivers for the autodock control unit. Drivers implement the
//! traits defined in `autodock_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`core`] - `SimCore`, the fixed-period physics loop and its timing statistics
//! - [`drivers`] - Driver implementations (simulation, mock)
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     autodock_hal                               │
//! │  ┌─────────────┐    ┌──────────────┐    ┌───────────────────┐  │
//! │  │ /ground     │◄───│  SimCore     │───►│  SimWorld         │  │
//! │  │ Topic       │    │ (physics     │    │ (pose, encoders,  │  │
//! │  └─────────────┘    │  loop)       │    │  camera, lights)  │  │
//! │                     └──────────────┘    └─────────▲─────────┘  │
//! │                                                   │            │
//! │                                   ┌───────────────┴─────────┐  │
//! │                                   │ Sim peripherals         │  │
//! │                                   │ (trait objects)         │  │
//! │                                   └─────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod core;
pub mod drivers;

pub use crate::core::SimCore;
pub use crate::drivers::simulation::{SimConfig, SimulationDriver};
