//! One full Explore → SearchLine → FollowLine → Charge → Explore cycle.

use autodock_common::hal::types::{GroundReading, Wheel};
use autodock_control_unit::FsmState;
use autodock_control_unit::state::machine::{Transition, TransitionCause};

use super::mock_fsm;

#[test]
fn full_docking_cycle() {
    let (mut fsm, rig, mut p) = mock_fsm();
    fsm.startup(&mut p).unwrap();
    let floor = GroundReading::uniform(800);
    let line = GroundReading::new([800, 800, 500, 800, 800]);
    let centered = GroundReading::uniform(560);
    let mut transitions: Vec<Transition> = Vec::new();
    let mut record = |t: Option<Transition>| transitions.extend(t);

    // Explore until 15s.
    for s in 0..=15 {
        fsm.timebase().set(s);
        record(fsm.step(&mut p, &floor).transition);
    }
    assert_eq!(fsm.state(), FsmState::SearchLine);
    assert!(rig.avoidance.enabled());

    // Line under the sensors.
    fsm.timebase().set(3);
    for _ in 0..11 {
        record(fsm.step(&mut p, &line).transition);
    }
    assert_eq!(fsm.state(), FsmState::FollowLine);
    assert_eq!(fsm.timebase().seconds(), 0);

    // Dock indicator lights up.
    rig.vision.set_brightness(200);
    for _ in 0..11 {
        record(fsm.step(&mut p, &centered).transition);
    }
    assert_eq!(fsm.state(), FsmState::Charge);
    assert!(!rig.avoidance.enabled());
    assert_eq!(rig.motion.speeds(), (0, 0));

    // Charge to completion.
    fsm.timebase().set(31);
    record(fsm.step(&mut p, &centered).transition);
    assert_eq!(fsm.state(), FsmState::Explore);
    assert_eq!(fsm.timebase().seconds(), 0);
    assert_eq!(fsm.working().return_side, Wheel::Left);

    let path: Vec<_> = transitions.iter().map(|t| (t.from, t.to, t.cause)).collect();
    assert_eq!(
        path,
        vec![
            (FsmState::Explore, FsmState::SearchLine, TransitionCause::ExploreElapsed),
            (FsmState::SearchLine, FsmState::FollowLine, TransitionCause::LineAcquired),
            (FsmState::FollowLine, FsmState::Charge, TransitionCause::ContactMade),
            (FsmState::Charge, FsmState::Explore, TransitionCause::ChargeComplete),
        ]
    );
}

#[test]
fn line_lost_grace_period_then_reacquire() {
    let (mut fsm, _rig, mut p) = mock_fsm();
    fsm.resume(FsmState::FollowLine);
    let off = GroundReading::new([950, 950, 950, 950, 950]);
    for _ in 0..11 {
        fsm.step(&mut p, &off);
    }
    assert_eq!(fsm.state(), FsmState::SearchLine);

    // The grace countdown swallows readings, even ones on the line.
    let line = GroundReading::new([500, 500, 500, 500, 500]);
    for _ in 0..100 {
        fsm.step(&mut p, &line);
    }
    assert_eq!(fsm.state(), FsmState::SearchLine);
    assert_eq!(fsm.working().line_found, 0);
}
