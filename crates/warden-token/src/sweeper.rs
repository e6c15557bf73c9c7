//! Background sweep of the revocation registry.

use crate::revocation::RevocationRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running sweeper task.
///
/// The task stops on [`SweeperHandle::shutdown`] or as soon as the handle is
/// dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "revocation sweeper ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a task that calls [`RevocationRegistry::sweep`] every `interval`.
///
/// Must be called from within a tokio runtime. `interval` must be non-zero.
pub fn spawn_sweeper(registry: Arc<RevocationRegistry>, interval: Duration) -> SweeperHandle {
    let (stop, mut stopped) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately.
        ticker.tick().await;

        tracing::debug!(interval = ?interval, "revocation sweeper started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = registry.sweep();
                    if removed > 0 {
                        tracing::debug!(
                            removed,
                            remaining = registry.len(),
                            "swept expired revocations"
                        );
                    }
                }
                // Fires on an explicit stop and when the handle is dropped.
                _ = stopped.changed() => break,
            }
        }
        tracing::debug!("revocation sweeper stopped");
    });

    SweeperHandle { stop, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    #[tokio::test]
    async fn test_sweeper_reclaims_expired_entries() {
        let registry = Arc::new(RevocationRegistry::new());
        registry.revoke("expired", Utc::now() - ChronoDuration::seconds(5));
        registry.revoke("live", Utc::now() + ChronoDuration::hours(1));

        let handle = spawn_sweeper(Arc::clone(&registry), Duration::from_millis(10));

        let mut waited = 0;
        while registry.is_revoked("expired") && waited < 200 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += 1;
        }

        assert!(!registry.is_revoked("expired"));
        assert!(registry.is_revoked("live"));
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let registry = Arc::new(RevocationRegistry::new());
        let handle = spawn_sweeper(registry, Duration::from_secs(60));
        assert!(!handle.is_finished());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_drop_stops_task() {
        let registry = Arc::new(RevocationRegistry::new());
        let handle = spawn_sweeper(Arc::clone(&registry), Duration::from_millis(10));
        drop(handle);

        let mut waited = 0;
        while Arc::strong_count(&registry) > 1 && waited < 200 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += 1;
        }
        assert_eq!(Arc::strong_count(&registry), 1);
    }
}
