use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::reconcile::StatusReconciler;

/// Drives [`StatusReconciler::tick`] on a fixed period.
#[derive(Clone)]
pub struct RefreshScheduler {
    reconciler: Arc<StatusReconciler>,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(reconciler: Arc<StatusReconciler>, period: Duration) -> Self {
        Self { reconciler, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks until `shutdown` resolves. The first tick fires one period
    /// after start; a tick already running is allowed to finish.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("Starting status update loop with interval: {:?}", self.period);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = timer.tick() => {
                    let report = self.reconciler.tick().await;
                    debug!(
                        updated = report.updated,
                        removed = report.removed,
                        failed = report.failed,
                        skipped = report.skipped,
                        "Status update tick finished"
                    );
                }
            }
        }
        info!("Status update loop stopped");
    }
}
