use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::sync::{watch, Mutex};

use crate::{
    db::{Database, Task},
    session::{Phase, SessionController, SessionError, SessionSnapshot},
};

use super::{
    recorder::{PendingWrites, PomodoroRecorder},
    ticker::TickSource,
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Drives one [`SessionController`]: serializes user actions and ticks,
/// keeps a tick source alive exactly while the phase needs one, and
/// publishes every snapshot on a watch channel.
///
/// Clones share the same session. The tick source is released when the last
/// clone is dropped.
#[derive(Clone)]
pub struct SessionRunner {
    controller: Arc<Mutex<SessionController>>,
    ticker: Arc<Mutex<Option<TickSource>>>,
    tick_interval: Duration,
    snapshots: watch::Receiver<SessionSnapshot>,
    pending_writes: PendingWrites,
    task: Arc<Task>,
}

impl SessionRunner {
    pub fn new(task: Task, tick_interval: Duration, db: Option<Database>) -> Result<Self> {
        let mut controller = SessionController::new(task.clone())?;
        let initial = controller.snapshot();

        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        controller.add_observer(move |snapshot: &SessionSnapshot| {
            snapshot_tx.send_replace(*snapshot);
        });

        let mut pending_writes = PendingWrites::default();
        if let Some(db) = db {
            let recorder = PomodoroRecorder::new(task.id, db, initial);
            pending_writes = recorder.pending();
            controller.add_observer(recorder);
        }

        Ok(Self {
            controller: Arc::new(Mutex::new(controller)),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval,
            snapshots: snapshot_rx,
            pending_writes,
            task: Arc::new(task),
        })
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.controller.lock().await.snapshot()
    }

    /// Receiver that sees every accepted transition, including ticks.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub async fn start(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(SessionController::start).await
    }

    pub async fn pause(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(SessionController::pause).await
    }

    pub async fn resume(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(SessionController::resume).await
    }

    pub async fn advance(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(SessionController::advance).await
    }

    pub async fn complete(&self) -> Result<SessionSnapshot, SessionError> {
        let snapshot = self.apply(SessionController::complete).await?;
        log_info!("task {} completed", self.task.id);
        Ok(snapshot)
    }

    /// True while a live tick source is attached.
    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .map_or(false, |source| !source.is_finished())
    }

    /// Release the tick source, wait for it to exit, then wait for pending
    /// pomodoro writes. The session state is left as is.
    pub async fn stop(&self) {
        let source = self.ticker.lock().await.take();
        if let Some(source) = source {
            source.stop().await;
        }
        self.pending_writes.flush().await;
    }

    async fn apply<F>(&self, action: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnOnce(&mut SessionController) -> Result<SessionSnapshot, SessionError>,
    {
        let mut controller = self.controller.lock().await;
        let previous = controller.phase();
        let snapshot = action(&mut *controller).map_err(|err| {
            log_warn!("task {} rejected action: {err}", self.task.id);
            err
        })?;

        // Reconcile while still holding the controller so a tick cannot
        // slip in between the transition and the tick source change.
        let mut ticker = self.ticker.lock().await;
        if controller.is_ticking() {
            let alive = ticker.as_ref().map_or(false, |source| !source.is_finished());
            // A fresh work interval gets a fresh cadence.
            let entered_work = snapshot.phase == Phase::Working && previous != Phase::Working;
            if !alive || entered_work {
                *ticker = Some(TickSource::spawn(self.controller.clone(), self.tick_interval));
            }
        } else if let Some(source) = ticker.take() {
            drop(source);
        }

        Ok(snapshot)
    }
}
