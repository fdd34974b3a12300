use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;

use crate::{
    db::{Database, Pomodoro},
    session::{Phase, SessionObserver, SessionSnapshot},
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_warn};

/// Inserts spawned by a recorder that have not been awaited yet.
#[derive(Clone, Default)]
pub struct PendingWrites(Arc<Mutex<JoinSet<()>>>);

impl PendingWrites {
    fn spawn_on<F>(&self, write: F, handle: &tokio::runtime::Handle)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut set = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        set.spawn_on(write, handle);
    }

    /// Wait for every write spawned so far.
    pub async fn flush(&self) {
        let mut set = {
            let mut guard = match self.0.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::take(&mut *guard)
        };

        while let Some(joined) = set.join_next().await {
            if let Err(err) = joined {
                log_error!("Pomodoro write did not finish: {err}");
            }
        }
    }
}

/// Observer that writes a [`Pomodoro`] row for every finished work interval.
pub struct PomodoroRecorder {
    task_id: i64,
    db: Database,
    last: SessionSnapshot,
    interval_started_at: Option<DateTime<Utc>>,
    pending: PendingWrites,
}

impl PomodoroRecorder {
    pub fn new(task_id: i64, db: Database, initial: SessionSnapshot) -> Self {
        Self {
            task_id,
            db,
            last: initial,
            interval_started_at: None,
            pending: PendingWrites::default(),
        }
    }

    pub fn pending(&self) -> PendingWrites {
        self.pending.clone()
    }

    fn write(&self, pomodoro: Pomodoro) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log_warn!(
                    "no async runtime; dropping pomodoro record for task {}",
                    self.task_id
                );
                return;
            }
        };

        let db = self.db.clone();
        self.pending.spawn_on(
            async move {
                if let Err(err) = db.insert_pomodoro(&pomodoro).await {
                    log_error!("Failed to record pomodoro for task {}: {err:?}", pomodoro.task_id);
                }
            },
            &handle,
        );
    }
}

impl SessionObserver for PomodoroRecorder {
    fn on_transition(&mut self, snapshot: &SessionSnapshot) {
        let now = Utc::now();

        // Resuming continues the same interval; only start and advance open one.
        if snapshot.phase == Phase::Working && matches!(self.last.phase, Phase::Idle | Phase::OnBreak)
        {
            self.interval_started_at = Some(now);
        }

        if snapshot.completed_intervals > self.last.completed_intervals {
            match self.interval_started_at.take() {
                Some(started_at) => self.write(Pomodoro::new(self.task_id, started_at, now)),
                None => log_warn!(
                    "task {} finished an interval with no recorded start",
                    self.task_id
                ),
            }
        }

        self.last = *snapshot;
    }
}
