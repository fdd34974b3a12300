use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Phase;

/// User-facing actions accepted by a session. `tick` is not listed because a
/// stray tick is ignored rather than rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Start,
    Pause,
    Resume,
    Advance,
    Complete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::Advance => "advance",
            Action::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: Action, phase: Phase },
    #[error("cannot complete task: {completed} of {target} intervals finished")]
    PrematureCompletion { completed: u32, target: u32 },
    #[error("session is done; {action} is no longer accepted")]
    TerminalState { action: Action },
    #[error("invalid task: {0}")]
    InvalidTask(&'static str),
}
