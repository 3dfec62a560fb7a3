//! Control loop against the simulated robot.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use autodock_control_unit::config::AutochargeConfig;
use autodock_control_unit::cycle::CycleRunner;
use autodock_control_unit::timebase::Timebase;
use autodock_control_unit::{AutochargeFsm, FsmState};
use autodock_hal::SimulationDriver;

#[test]
fn explores_on_simulated_robot() {
    let config = AutochargeConfig::default();
    let mut driver = SimulationDriver::new(config.simulation.clone()).unwrap();
    let peripherals = driver.peripherals();
    let feed = driver.ground_topic().subscribe();
    driver.start().unwrap();

    let fsm = AutochargeFsm::new(&config, Timebase::new());
    let mut runner = CycleRunner::new(fsm, peripherals, feed, Arc::new(AtomicBool::new(true)))
        .with_max_steps(Some(20));
    let stats = runner.run().unwrap();

    assert_eq!(stats.steps, 20);
    assert_eq!(runner.fsm().state(), FsmState::Explore);
    assert_eq!(driver.world().lock().avoidance(), Some(700));
    driver.shutdown().unwrap();
}
