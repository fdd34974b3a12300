//! End-to-end session runs through the public controller API.

use std::sync::{Arc, Mutex};

use pomo_lib::{
    db::Task,
    session::{Phase, SessionController, SessionError, SessionSnapshot},
};

fn snap(phase: Phase, remaining_ms: u64, completed: u32) -> SessionSnapshot {
    SessionSnapshot::new(phase, remaining_ms, completed)
}

fn controller(target_intervals: u32, interval_ms: u64) -> SessionController {
    SessionController::new(Task::new(1, "scenario", target_intervals, interval_ms))
        .expect("valid task")
}

#[test]
fn two_intervals_with_a_break_between() {
    let mut session = controller(2, 1500);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    session.add_observer(move |snapshot: &SessionSnapshot| sink.lock().unwrap().push(*snapshot));

    assert_eq!(session.start().unwrap(), snap(Phase::Working, 1500, 0));
    assert_eq!(session.tick(1000), snap(Phase::Working, 500, 0));
    assert_eq!(session.tick(1000), snap(Phase::OnBreak, 1500, 1));
    assert_eq!(session.advance().unwrap(), snap(Phase::Working, 1500, 1));
    assert_eq!(session.tick(1500), snap(Phase::OnBreak, 1500, 2));
    assert_eq!(session.complete().unwrap(), snap(Phase::Done, 0, 2));

    let emitted = seen.lock().unwrap().clone();
    assert_eq!(
        emitted,
        vec![
            snap(Phase::Working, 1500, 0),
            snap(Phase::Working, 500, 0),
            snap(Phase::OnBreak, 1500, 1),
            snap(Phase::Working, 1500, 1),
            snap(Phase::OnBreak, 1500, 2),
            snap(Phase::Done, 0, 2),
        ]
    );
}

#[test]
fn paused_session_ignores_stray_ticks() {
    let mut session = controller(2, 1500);
    session.start().unwrap();
    assert_eq!(session.pause().unwrap(), snap(Phase::Paused, 1500, 0));

    for _ in 0..10 {
        assert_eq!(session.tick(1000), snap(Phase::Paused, 1500, 0));
    }

    assert_eq!(session.resume().unwrap(), snap(Phase::Working, 1500, 0));
}

#[test]
fn completing_from_idle_is_premature() {
    let mut session = controller(1, 1500);

    assert_eq!(
        session.complete(),
        Err(SessionError::PrematureCompletion {
            completed: 0,
            target: 1,
        })
    );
    assert_eq!(session.snapshot(), snap(Phase::Idle, 1500, 0));
}

#[test]
fn restarting_after_done_needs_a_new_session() {
    let mut session = controller(1, 10);
    session.start().unwrap();
    session.tick(10);
    session.complete().unwrap();
    assert!(matches!(session.start(), Err(SessionError::TerminalState { .. })));

    let mut again = SessionController::new(session.task().clone()).unwrap();
    assert_eq!(again.start().unwrap(), snap(Phase::Working, 10, 0));
}
