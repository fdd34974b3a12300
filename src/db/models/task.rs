//! Task data models.
//!
//! A `Task` is what the session core reads; everything else about it
//! (tags, timestamps) is bookkeeping for the list views.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub label: String,
    pub target_intervals: u32,
    /// Length of one work interval, also used as the break length.
    pub interval_ms: u64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: i64, label: impl Into<String>, target_intervals: u32, interval_ms: u64) -> Self {
        let now = Utc::now();
        Self {
            id,
            label: label.into(),
            target_intervals,
            interval_ms,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input data for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub label: String,
    pub target_intervals: u32,
    pub interval_ms: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            bail!("task label must not be empty");
        }
        if self.target_intervals == 0 {
            bail!("a task needs at least one interval");
        }
        if self.interval_ms == 0 {
            bail!("interval duration must be greater than zero");
        }
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            bail!("tags must not be blank");
        }
        Ok(())
    }
}

/// Result of listing tasks, with the total alongside the rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub count: usize,
    pub results: Vec<Task>,
}

impl From<Vec<Task>> for TaskList {
    fn from(results: Vec<Task>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}
