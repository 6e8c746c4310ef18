//! Shutdown coordination for service units.

use tokio::sync::watch;

/// Latched shutdown flag.
///
/// Once triggered it stays triggered, so a task that subscribes after the
/// trigger still observes it.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new, untriggered shutdown latch.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for a [`Shutdown`] to be triggered.
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolve once shutdown is triggered (immediately if it already was).
    pub async fn wait(mut self) {
        // A dropped latch can never trigger; treat it as shutdown.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
