use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::debug;

use crate::controller::LauncherController;

/// Periodic status poll tied to the lifetime of this handle.
///
/// Dropping the handle ends the timer loop between ticks. A poll already in
/// flight runs to completion and its result is applied; no further poll starts.
pub struct SessionPoller {
    task: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl SessionPoller {
    /// Starts polling. The first poll happens after one full `period`.
    pub fn spawn(controller: Arc<LauncherController>, period: Duration) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    // A closed channel also means the handle is gone.
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {}
                }
                if let Err(err) = controller.poll_sessions().await {
                    debug!(%err, "session poll failed");
                }
            }
            debug!("session poller stopped");
        });
        Self { task, shutdown }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for SessionPoller {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}
