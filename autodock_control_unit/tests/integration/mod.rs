mod config_file;
mod docking_cycle;
mod properties;
mod scenarios;
mod simulation;

use autodock_common::hal::driver::Peripherals;
use autodock_control_unit::AutochargeFsm;
use autodock_control_unit::config::AutochargeConfig;
use autodock_control_unit::timebase::Timebase;
use autodock_hal::drivers::mock::MockRig;

/// Default machine wired to a fresh mock rig.
pub fn mock_fsm() -> (AutochargeFsm, MockRig, Peripherals) {
    let rig = MockRig::new();
    let peripherals = rig.peripherals();
    let fsm = AutochargeFsm::new(&AutochargeConfig::default(), Timebase::new());
    (fsm, rig, peripherals)
}
