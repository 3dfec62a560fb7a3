//! Reference scenarios for debounce, escape and contact hysteresis.

use autodock_common::hal::types::GroundReading;
use autodock_control_unit::FsmState;
use autodock_control_unit::state::machine::TransitionCause;

use super::mock_fsm;

#[test]
fn line_acquired_on_eleventh_consecutive_reading() {
    let (mut fsm, rig, mut p) = mock_fsm();
    fsm.resume(FsmState::SearchLine);
    assert_eq!(fsm.working().out_of_line, 0);

    let reading = GroundReading::new([800, 800, 500, 800, 800]);
    for i in 1..=10 {
        let out = fsm.step(&mut p, &reading);
        assert!(out.transition.is_none(), "early transition on reading {i}");
    }
    assert_eq!(rig.vision.triggers(), 0);

    let out = fsm.step(&mut p, &reading);
    let t = out.transition.expect("transition on the 11th reading");
    assert_eq!((t.from, t.to), (FsmState::SearchLine, FsmState::FollowLine));
    assert_eq!(t.cause, TransitionCause::LineAcquired);
    assert_eq!(rig.vision.triggers(), 1);
}

#[test]
fn interrupted_line_detection_starts_over() {
    let (mut fsm, _rig, mut p) = mock_fsm();
    fsm.resume(FsmState::SearchLine);
    let line = GroundReading::new([800, 800, 500, 800, 800]);
    let floor = GroundReading::uniform(800);

    for _ in 0..10 {
        fsm.step(&mut p, &line);
    }
    fsm.step(&mut p, &floor);
    assert_eq!(fsm.working().line_found, 0);
    for _ in 0..10 {
        fsm.step(&mut p, &line);
    }
    assert_eq!(fsm.state(), FsmState::SearchLine);
    fsm.step(&mut p, &line);
    assert_eq!(fsm.state(), FsmState::FollowLine);
}

#[test]
fn three_escapes_then_forced_explore() {
    let (mut fsm, rig, mut p) = mock_fsm();
    fsm.resume(FsmState::FollowLine);
    let centered = GroundReading::uniform(560);

    let mut escapes = Vec::new();
    let mut aborted_at = None;
    for step in 1..=35 {
        fsm.timebase().tick();
        let out = fsm.step(&mut p, &centered);
        if out.escaped {
            escapes.push(step);
        }
        if let Some(t) = out.transition {
            assert_eq!(t.cause, TransitionCause::EscapeAbort);
            aborted_at = Some(step);
            break;
        }
    }

    assert_eq!(escapes, vec![11, 22, 33]);
    assert_eq!(aborted_at, Some(33));
    assert_eq!(fsm.state(), FsmState::Explore);
    assert_eq!(fsm.timebase().seconds(), 0);
    // Two legs per escape plus the reverse.
    assert_eq!(rig.motion.position_resets().len(), 7);
}

#[test]
fn contact_lost_below_band_without_debounce() {
    let (mut fsm, rig, mut p) = mock_fsm();
    fsm.resume(FsmState::Charge);
    let reading = GroundReading::uniform(560);

    rig.vision.set_brightness(171);
    let out = fsm.step(&mut p, &reading);
    assert!(out.transition.is_none());
    assert_eq!(fsm.state(), FsmState::Charge);
    let triggers = rig.vision.triggers();

    rig.vision.set_brightness(169);
    let out = fsm.step(&mut p, &reading);
    let t = out.transition.expect("contact lost on the second sample");
    assert_eq!((t.from, t.to), (FsmState::Charge, FsmState::FollowLine));
    assert_eq!(t.cause, TransitionCause::ContactLost);
    assert_eq!(rig.vision.triggers(), triggers + 1);
}

#[test]
fn charge_bounce_keeps_timer_and_escapes_immediately() {
    let (mut fsm, rig, mut p) = mock_fsm();
    fsm.resume(FsmState::Charge);
    fsm.timebase().set(25);
    rig.vision.set_brightness(100);
    fsm.step(&mut p, &GroundReading::uniform(560));
    assert_eq!(fsm.state(), FsmState::FollowLine);
    assert_eq!(fsm.timebase().seconds(), 25);

    let out = fsm.step(&mut p, &GroundReading::uniform(560));
    assert!(out.escaped);
    assert_eq!(fsm.timebase().seconds(), 0);
}

#[test]
fn abort_wins_over_contact_on_third_escape() {
    let (mut fsm, rig, mut p) = mock_fsm();
    fsm.resume(FsmState::FollowLine);
    rig.vision.set_brightness(250);
    let centered = GroundReading::uniform(560);

    for _ in 0..2 {
        fsm.timebase().set(11);
        fsm.step(&mut p, &centered);
    }
    assert_eq!(fsm.state(), FsmState::FollowLine);
    fsm.timebase().set(11);
    let t = fsm.step(&mut p, &centered).transition.unwrap();
    assert_eq!(t.to, FsmState::Explore);
}
