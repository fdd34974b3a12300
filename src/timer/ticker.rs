use std::{sync::Arc, time::Duration};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::session::SessionController;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// A running periodic tick feed for one session.
///
/// Owning a `TickSource` is owning the timer: dropping it cancels the loop,
/// so a detached or stopped session cannot leave a tick task behind.
pub struct TickSource {
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl TickSource {
    pub fn spawn(controller: Arc<Mutex<SessionController>>, cadence: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(controller, cadence, cancel_token.clone()));

        Self {
            cancel_token,
            handle: Some(handle),
        }
    }

    /// True once the loop has exited on its own or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.cancel_token.is_cancelled()
            || self.handle.as_ref().map_or(true, |handle| handle.is_finished())
    }

    /// Cancel and wait for the loop to exit.
    pub async fn stop(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    log::error!("tick loop panicked: {err}");
                }
            }
        }
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn tick_loop(
    controller: Arc<Mutex<SessionController>>,
    cadence: Duration,
    cancel_token: CancellationToken,
) {
    let delta_ms = u64::try_from(cadence.as_millis()).unwrap_or(u64::MAX).max(1);
    let mut interval = time::interval_at(Instant::now() + cadence, cadence);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_debug!("tick loop started with {}ms cadence", delta_ms);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = interval.tick() => {
                let mut guard = controller.lock().await;
                // A phase change may have released this source while we
                // waited for the lock.
                if cancel_token.is_cancelled() || !guard.is_ticking() {
                    break;
                }
                let snapshot = guard.tick(delta_ms);
                log_debug!(
                    "task {} tick: {} remaining={}ms completed={}",
                    guard.task().id,
                    snapshot.phase,
                    snapshot.remaining_ms,
                    snapshot.completed_intervals
                );
            }
        }
    }

    log_info!("tick loop stopped");
}
