use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Working,
    Paused,
    OnBreak,
    Done,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Working => "Working",
            Phase::Paused => "Paused",
            Phase::OnBreak => "OnBreak",
            Phase::Done => "Done",
        }
    }

    /// Phases during which the driver must feed ticks.
    pub fn is_ticking(&self) -> bool {
        matches!(self, Phase::Working | Phase::OnBreak)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the presentation layer reads back after every transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub remaining_ms: u64,
    pub completed_intervals: u32,
}

impl SessionSnapshot {
    pub fn new(phase: Phase, remaining_ms: u64, completed_intervals: u32) -> Self {
        Self {
            phase,
            remaining_ms,
            completed_intervals,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: Phase,
    pub remaining_ms: u64,
    pub completed_intervals: u32,
    pub target_intervals: u32,
    pub interval_ms: u64,
}

impl SessionState {
    pub fn new(target_intervals: u32, interval_ms: u64) -> Self {
        Self {
            phase: Phase::Idle,
            remaining_ms: interval_ms,
            completed_intervals: 0,
            target_intervals,
            interval_ms,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.phase, self.remaining_ms, self.completed_intervals)
    }

    pub fn intervals_left(&self) -> u32 {
        self.target_intervals.saturating_sub(self.completed_intervals)
    }

    pub fn begin_interval(&mut self) {
        self.phase = Phase::Working;
        self.remaining_ms = self.interval_ms;
    }

    /// Counts the running interval as finished and starts the break countdown.
    /// Overshoot past zero is dropped, never carried into the break.
    pub fn finish_interval(&mut self) {
        self.completed_intervals = (self.completed_intervals + 1).min(self.target_intervals);
        self.phase = Phase::OnBreak;
        self.remaining_ms = self.interval_ms;
    }

    pub fn count_down(&mut self, delta_ms: u64) {
        self.remaining_ms = self.remaining_ms.saturating_sub(delta_ms);
    }

    pub fn finish(&mut self) {
        self.phase = Phase::Done;
        self.remaining_ms = 0;
    }
}
