//! Driver implementations.
//!
//! - [`simulation`] - Physics-based simulation of the robot, the floor line and the dock
//! - [`mock`] - Scriptable drivers with inspectable state, for tests and benches
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the peripheral traits from `autodock_common::hal::driver`
//! 3. Add a match arm to [`create_driver`]

pub mod mock;
pub mod simulation;

use autodock_common::hal::driver::HalError;

use crate::drivers::simulation::{SimConfig, SimulationDriver};

/// Names of the drivers this crate can build.
pub const AVAILABLE_DRIVERS: &[&str] = &["simulation"];

/// Build a driver by name.
///
/// # Errors
/// Returns `HalError::DriverNotFound` for unknown names and
/// `HalError::ConfigError` if the simulation config is invalid.
pub fn create_driver(name: &str, config: &SimConfig) -> Result<SimulationDriver, HalError> {
    match name {
        "simulation" => SimulationDriver::new(config.clone()),
        other => Err(HalError::DriverNotFound(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_driver_not_found() {
        let result = create_driver("epuck-serial", &SimConfig::default());
        assert!(matches!(result, Err(HalError::DriverNotFound(_))));
    }

    #[test]
    fn simulation_driver_builds() {
        let driver = create_driver("simulation", &SimConfig::default()).expect("driver");
        assert_eq!(driver.name(), "simulation");
    }
}
