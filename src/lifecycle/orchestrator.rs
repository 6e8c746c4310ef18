//! The keeper: brings service units up, waits for termination, tears them down.
//!
//! ```text
//! new():   open store → register units → own termination channel
//! start(): spawn unit.start() per unit          (Unstarted → Running)
//! wait_for_termination(): first signal only
//! stop():  spawn unit.stop() per unit → drain → close store
//!                                                (Running → Stopping → Stopped)
//! ```
//!
//! Every start and stop runs in its own task holding an [`InFlightGuard`]
//! from one shared [`InFlight`]. The drain in `stop` therefore also waits for
//! start tasks that have not finished yet, and the store is never closed while
//! any unit operation is still running.
//!
//! Unit failures are logged and counted; they never fail the keeper.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::Instrument;

use crate::lifecycle::inflight::{InFlight, InFlightGuard};
use crate::lifecycle::signals::{Signal, SignalTrigger, Termination};
use crate::observability::metrics;
use crate::service::ServiceUnit;
use crate::storage::{Store, StoreBackend, StorageError};

/// Keeper lifecycle states. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unstarted,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Unstarted => "unstarted",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the keeper itself.
#[derive(Debug, Error)]
pub enum KeeperError {
    /// The store could not be opened; the keeper never reaches `Running`.
    #[error("fatal error on storage initialization: {0}")]
    StoreOpen(#[source] StorageError),

    /// An operation was invoked in the wrong lifecycle state.
    #[error("cannot move keeper from {from} to {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },
}

/// Lifecycle orchestrator for a fixed set of service units and one store.
pub struct Keeper {
    units: Mutex<Vec<Arc<dyn ServiceUnit>>>,
    store: Arc<dyn Store>,
    inflight: InFlight,
    termination: Mutex<Termination>,
    trigger: SignalTrigger,
    state: watch::Sender<LifecycleState>,
}

impl Keeper {
    /// Open the store and register `units`.
    ///
    /// Fails with [`KeeperError::StoreOpen`] if the store cannot be opened,
    /// in which case no unit is ever started.
    pub async fn new(
        backend: &dyn StoreBackend,
        units: Vec<Arc<dyn ServiceUnit>>,
        termination: Termination,
    ) -> Result<Self, KeeperError> {
        let store = match backend.open().await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "fatal error on storage initialization");
                return Err(KeeperError::StoreOpen(e));
            }
        };

        tracing::info!(
            units = units.len(),
            names = ?units.iter().map(|u| u.name().to_string()).collect::<Vec<_>>(),
            "Keeper initialized"
        );

        let (state, _) = watch::channel(LifecycleState::Unstarted);
        Ok(Self {
            units: Mutex::new(units),
            store,
            inflight: InFlight::new(),
            trigger: termination.trigger(),
            termination: Mutex::new(termination),
            state,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Observe lifecycle transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Number of start/stop operations scheduled but not yet finished.
    pub fn inflight(&self) -> usize {
        self.inflight.count()
    }

    /// A trigger feeding this keeper's termination channel.
    pub fn trigger(&self) -> SignalTrigger {
        self.trigger.clone()
    }

    /// Number of registered units.
    pub async fn unit_count(&self) -> usize {
        self.units.lock().await.len()
    }

    /// Start every unit concurrently.
    ///
    /// Returns as soon as all start tasks are scheduled; it does not wait for
    /// any of them to finish.
    pub async fn start(&self) -> Result<(), KeeperError> {
        self.transition(LifecycleState::Unstarted, LifecycleState::Running)?;

        let units = self.units.lock().await;
        for unit in units.iter() {
            let guard = self.inflight.enter();
            tokio::spawn(start_unit(Arc::clone(unit), guard));
        }
        tracing::info!(units = units.len(), "Unit starts scheduled");
        Ok(())
    }

    /// Wait for the first termination signal.
    pub async fn wait_for_termination(&self) -> Signal {
        let signal = self.termination.lock().await.recv().await;
        tracing::info!(%signal, "Termination signal received");
        signal
    }

    /// Stop every unit concurrently, drain, then close the store.
    pub async fn stop(&self) -> Result<(), KeeperError> {
        self.transition(LifecycleState::Running, LifecycleState::Stopping)?;

        {
            let units = self.units.lock().await;
            for unit in units.iter() {
                let guard = self.inflight.enter();
                tokio::spawn(stop_unit(Arc::clone(unit), guard));
            }
            tracing::info!(units = units.len(), "Unit stops scheduled");
        }

        tracing::debug!(inflight = self.inflight.count(), "Draining unit operations");
        self.inflight.drained().await;
        tracing::debug!("All unit operations finished");

        if let Err(e) = self.store.close().await {
            tracing::error!(error = %e, "Failed to close store");
        }

        self.transition(LifecycleState::Stopping, LifecycleState::Stopped)
    }

    /// Start, wait for termination, stop.
    ///
    /// A keeper already started by hand skips the start and still goes
    /// through the wait, stop and store close. Unit failures do not affect
    /// the result; only a keeper that is already stopping or stopped returns
    /// an error, and that keeper has closed or is closing its store.
    pub async fn run(self) -> Result<(), KeeperError> {
        let span = tracing::info_span!("keeper");
        async move {
            match self.start().await {
                Ok(()) => {}
                Err(KeeperError::InvalidTransition {
                    from: LifecycleState::Running,
                    ..
                }) => tracing::debug!("Keeper already running"),
                Err(e) => return Err(e),
            }
            self.wait_for_termination().await;
            self.stop().await?;
            tracing::info!("Keeper stopped");
            Ok::<(), KeeperError>(())
        }
        .instrument(span)
        .await
    }

    fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), KeeperError> {
        let mut result = Ok(());
        self.state.send_if_modified(|current| {
            if *current != from {
                result = Err(KeeperError::InvalidTransition { from: *current, to });
                return false;
            }
            *current = to;
            true
        });
        if result.is_ok() {
            tracing::debug!(%from, %to, "Keeper state changed");
        }
        result
    }
}

async fn start_unit(unit: Arc<dyn ServiceUnit>, _guard: InFlightGuard) {
    let span = tracing::info_span!("unit", name = %unit.name());
    async {
        match unit.start().await {
            Ok(()) => {
                metrics::record_unit_start(unit.name(), true);
                tracing::info!("Unit start finished");
            }
            Err(e) => {
                metrics::record_unit_start(unit.name(), false);
                tracing::error!(error = %e, "Endpoint not started");
            }
        }
    }
    .instrument(span)
    .await
}

async fn stop_unit(unit: Arc<dyn ServiceUnit>, _guard: InFlightGuard) {
    let span = tracing::info_span!("unit", name = %unit.name());
    async {
        match unit.stop().await {
            Ok(()) => {
                metrics::record_unit_stop(unit.name(), true);
                tracing::info!("Unit stopped");
            }
            Err(e) => {
                metrics::record_unit_stop(unit.name(), false);
                tracing::error!(error = %e, "Failed to stop unit");
            }
        }
    }
    .instrument(span)
    .await
}
