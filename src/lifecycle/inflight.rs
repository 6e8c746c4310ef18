//! In-flight operation tracking.
//!
//! A wait-group shared by the start and stop phases. Every scheduled
//! operation holds an [`InFlightGuard`]; dropping the guard (normal return,
//! error, or panic unwinding) decrements the count exactly once.
//! [`InFlight::drained`] resolves once the count is back to zero, so a drain
//! started during shutdown also waits for start operations that are still
//! running.

use std::sync::Arc;

use tokio::sync::watch;

use crate::observability::metrics;

/// Shared counter of operations that have been scheduled but not finished.
#[derive(Clone)]
pub struct InFlight {
    count: Arc<watch::Sender<usize>>,
}

impl InFlight {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Record one more operation. Call before the operation is scheduled.
    pub fn enter(&self) -> InFlightGuard {
        self.count.send_modify(|n| *n += 1);
        metrics::record_inflight(self.count());
        InFlightGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Current number of unfinished operations.
    pub fn count(&self) -> usize {
        *self.count.borrow()
    }

    /// Wait until every operation entered so far has finished.
    pub async fn drained(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one in-flight operation; finishes it on drop.
#[must_use = "dropping the guard immediately marks the operation as finished"]
pub struct InFlightGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
        metrics::record_inflight(*self.count.borrow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_drained_when_idle() {
        let inflight = InFlight::new();
        assert_eq!(inflight.count(), 0);
        tokio::time::timeout(Duration::from_millis(100), inflight.drained())
            .await
            .expect("idle tracker should be drained");
    }

    #[tokio::test]
    async fn test_guard_drop_decrements() {
        let inflight = InFlight::new();
        let a = inflight.enter();
        let b = inflight.enter();
        assert_eq!(inflight.count(), 2);
        drop(a);
        assert_eq!(inflight.count(), 1);
        drop(b);
        assert_eq!(inflight.count(), 0);
    }

    #[tokio::test]
    async fn test_drain_waits_for_every_guard() {
        let inflight = InFlight::new();
        let fast = inflight.enter();
        let slow = inflight.enter();

        tokio::spawn(async move {
            drop(fast);
        });
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            drop(slow);
        });

        let pending = tokio::time::timeout(Duration::from_millis(20), inflight.drained()).await;
        assert!(pending.is_err(), "drain must not finish while the slow guard is alive");

        tokio::time::timeout(Duration::from_secs(2), inflight.drained())
            .await
            .expect("drain should finish once all guards drop");
        assert_eq!(inflight.count(), 0);
    }

    #[tokio::test]
    async fn test_panicking_task_still_decrements() {
        let inflight = InFlight::new();
        let guard = inflight.enter();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("unit blew up");
        });
        assert!(handle.await.is_err());
        assert_eq!(inflight.count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_the_count() {
        let inflight = InFlight::new();
        let other = inflight.clone();
        let _guard = other.enter();
        assert_eq!(inflight.count(), 1);
    }
}
