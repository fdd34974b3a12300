use std::fmt;

use crate::db::models::Task;

use super::{Action, Phase, SessionError, SessionSnapshot, SessionState};

/// Receives the new snapshot after every accepted transition.
pub trait SessionObserver: Send {
    fn on_transition(&mut self, snapshot: &SessionSnapshot);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionSnapshot) + Send,
{
    fn on_transition(&mut self, snapshot: &SessionSnapshot) {
        self(snapshot)
    }
}

/// State machine for a single run of one task.
///
/// The controller owns no clock. Time only moves through [`tick`], so a
/// run is a pure function of the actions fed into it and can be replayed
/// exactly in tests.
///
/// [`tick`]: SessionController::tick
pub struct SessionController {
    task: Task,
    state: SessionState,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("task_id", &self.task.id)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SessionController {
    pub fn new(task: Task) -> Result<Self, SessionError> {
        if task.target_intervals == 0 {
            return Err(SessionError::InvalidTask(
                "target intervals must be at least 1",
            ));
        }
        if task.interval_ms == 0 {
            return Err(SessionError::InvalidTask(
                "interval duration must be at least 1 ms",
            ));
        }

        let state = SessionState::new(task.target_intervals, task.interval_ms);
        Ok(Self {
            task,
            state,
            observers: Vec::new(),
        })
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_ticking(&self) -> bool {
        self.state.phase.is_ticking()
    }

    pub fn add_observer<O>(&mut self, observer: O)
    where
        O: SessionObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn start(&mut self) -> Result<SessionSnapshot, SessionError> {
        self.expect_phase(Action::Start, Phase::Idle)?;
        self.state.begin_interval();
        Ok(self.emit())
    }

    pub fn pause(&mut self) -> Result<SessionSnapshot, SessionError> {
        self.expect_phase(Action::Pause, Phase::Working)?;
        self.state.phase = Phase::Paused;
        Ok(self.emit())
    }

    pub fn resume(&mut self) -> Result<SessionSnapshot, SessionError> {
        self.expect_phase(Action::Resume, Phase::Paused)?;
        self.state.phase = Phase::Working;
        Ok(self.emit())
    }

    /// Moves from a break into the next work interval. Once every interval
    /// is finished this is a no-op and the caller should `complete` instead.
    pub fn advance(&mut self) -> Result<SessionSnapshot, SessionError> {
        self.expect_phase(Action::Advance, Phase::OnBreak)?;
        if self.state.intervals_left() == 0 {
            return Ok(self.snapshot());
        }
        self.state.begin_interval();
        Ok(self.emit())
    }

    pub fn complete(&mut self) -> Result<SessionSnapshot, SessionError> {
        self.reject_if_done(Action::Complete)?;
        if self.state.intervals_left() > 0 {
            return Err(SessionError::PrematureCompletion {
                completed: self.state.completed_intervals,
                target: self.state.target_intervals,
            });
        }
        self.state.finish();
        Ok(self.emit())
    }

    /// Applies `delta_ms` of elapsed time. Ignored outside `Working` and
    /// `OnBreak`, and for a zero delta.
    pub fn tick(&mut self, delta_ms: u64) -> SessionSnapshot {
        if delta_ms == 0 {
            return self.snapshot();
        }

        match self.state.phase {
            Phase::Working => {
                if delta_ms >= self.state.remaining_ms {
                    self.state.finish_interval();
                } else {
                    self.state.count_down(delta_ms);
                }
            }
            Phase::OnBreak => {
                if self.state.remaining_ms == 0 {
                    return self.snapshot();
                }
                // Break expiry is advisory: the countdown stops at zero and
                // waits for `advance` or `complete`.
                self.state.count_down(delta_ms);
            }
            Phase::Idle | Phase::Paused | Phase::Done => return self.snapshot(),
        }

        self.emit()
    }

    fn expect_phase(&self, action: Action, expected: Phase) -> Result<(), SessionError> {
        self.reject_if_done(action)?;
        if self.state.phase != expected {
            return Err(SessionError::InvalidTransition {
                action,
                phase: self.state.phase,
            });
        }
        Ok(())
    }

    fn reject_if_done(&self, action: Action) -> Result<(), SessionError> {
        if self.state.phase == Phase::Done {
            return Err(SessionError::TerminalState { action });
        }
        Ok(())
    }

    fn emit(&mut self) -> SessionSnapshot {
        let snapshot = self.state.snapshot();
        for observer in self.observers.iter_mut() {
            observer.on_transition(&snapshot);
        }
        snapshot
    }
}
