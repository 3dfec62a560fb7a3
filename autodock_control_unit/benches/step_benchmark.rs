//! Control step benchmark.
//!
//! Measures one `AutochargeFsm::step` per state on mock peripherals, without
//! maneuvers (timers held below every limit).

use std::hint::black_box;

use autodock_common::hal::types::GroundReading;
use autodock_control_unit::config::AutochargeConfig;
use autodock_control_unit::control::line_follow::{
    CenteringParams, CenteringState, centering_command,
};
use autodock_control_unit::timebase::Timebase;
use autodock_control_unit::{AutochargeFsm, FsmState};
use autodock_hal::drivers::mock::MockRig;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

/// Readings cycling through every centering rule.
const READINGS: [GroundReading; 5] = [
    GroundReading::new([800, 800, 800, 800, 400]),
    GroundReading::new([800, 800, 800, 400, 800]),
    GroundReading::new([750, 600, 400, 600, 600]),
    GroundReading::new([400, 600, 850, 600, 600]),
    GroundReading::new([560, 560, 560, 560, 560]),
];

fn bench_centering(c: &mut Criterion) {
    let params = CenteringParams::default();
    c.bench_function("centering_command", |b| {
        let mut state = CenteringState::default();
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % READINGS.len();
            black_box(centering_command(
                black_box(&READINGS[i]),
                &mut state,
                &params,
            ))
        });
    });
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("fsm_step");
    let states = [
        (FsmState::Explore, GroundReading::uniform(800)),
        (FsmState::SearchLine, GroundReading::uniform(800)),
        (FsmState::FollowLine, GroundReading::uniform(560)),
        (FsmState::Charge, GroundReading::uniform(560)),
    ];

    for (state, reading) in states {
        let rig = MockRig::new();
        rig.vision.set_brightness(175);
        rig.motion.set_recording(false);
        let mut peripherals = rig.peripherals();
        let mut fsm = AutochargeFsm::new(&AutochargeConfig::default(), Timebase::new());
        fsm.resume(state);

        group.bench_with_input(BenchmarkId::from_parameter(state), &reading, |b, r| {
            b.iter(|| black_box(fsm.step(&mut peripherals, black_box(r))));
        });
        assert_eq!(fsm.state(), state);
    }
    group.finish();
}

criterion_group!(benches, bench_centering, bench_step);
criterion_main!(benches);
