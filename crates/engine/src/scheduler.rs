//! Recurring replay
//!
//! Replays one site on a background task at a fixed interval until the
//! handle is stopped.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::driver::DriverFactory;
use crate::replay::{ReplayEngine, ReplaySummary};

pub struct Scheduler;

impl Scheduler {
    /// Start replaying `site_name` every `interval`.
    ///
    /// The first pass starts immediately. A failed pass is logged and the
    /// loop carries on with the next one.
    pub fn spawn<F>(engine: Arc<ReplayEngine<F>>, site_name: impl Into<String>, interval: Duration) -> ScheduleHandle
    where
        F: DriverFactory + 'static,
    {
        let site_name = site_name.into();
        let token = CancellationToken::new();
        let cancel = token.clone();

        let task = tokio::spawn(async move {
            info!("Scheduled replay of {} every {:?}", site_name, interval);
            let mut completed = 0u64;

            while !cancel.is_cancelled() {
                let start = std::time::Instant::now();
                match engine.replay(&site_name).await {
                    Ok(rows) => {
                        completed += 1;
                        let summary =
                            ReplaySummary::from_rows(&site_name, &rows, start.elapsed().as_millis() as u64);
                        debug!(
                            "Pass {} for {}: {} passed, {} failed",
                            completed, site_name, summary.passed, summary.failed
                        );
                    }
                    Err(e) => error!("Scheduled replay of {} failed: {}", site_name, e),
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }

            info!("Stopped scheduled replay of {} after {} pass(es)", site_name, completed);
            completed
        });

        ScheduleHandle { token, task }
    }
}

/// Owner of a running schedule
pub struct ScheduleHandle {
    token: CancellationToken,
    task: JoinHandle<u64>,
}

impl ScheduleHandle {
    /// Request a stop without waiting. A pass in flight still finishes.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token that stops the schedule when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the schedule and wait for it, returning how many passes
    /// completed successfully
    pub async fn stop(self) -> u64 {
        self.token.cancel();
        match self.task.await {
            Ok(completed) => completed,
            Err(e) => {
                error!("Scheduler task ended abnormally: {}", e);
                0
            }
        }
    }
}
