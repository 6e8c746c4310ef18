//! OS signal handling.
//!
//! # Responsibilities
//! - Subscribe once to SIGINT (ctrl-c) and SIGTERM
//! - Translate them into a single termination channel
//! - Allow programmatic delivery for tests and embedding
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Channel holds one pending signal; extra deliveries are dropped
//! - Only the first delivery is acted on by the keeper

use std::fmt;

use tokio::sync::mpsc;

/// A process termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Operator interrupt (SIGINT / ctrl-c).
    Interrupt,
    /// Orderly termination request (SIGTERM).
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Interrupt => write!(f, "interrupt"),
            Signal::Terminate => write!(f, "terminate"),
        }
    }
}

/// Receiving end of the termination channel.
pub struct Termination {
    rx: mpsc::Receiver<Signal>,
    tx: mpsc::Sender<Signal>,
}

impl Termination {
    /// Termination fed only by [`SignalTrigger`]s.
    pub fn manual() -> (Self, SignalTrigger) {
        let (tx, rx) = mpsc::channel(1);
        let trigger = SignalTrigger { tx: tx.clone() };
        (Self { rx, tx }, trigger)
    }

    /// Termination fed by the process' SIGINT and SIGTERM.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn os() -> std::io::Result<Self> {
        let (termination, trigger) = Self::manual();

        // Both handlers are installed before returning, so no delivery falls
        // through to the default action while the forwarding task spins up.
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut interrupt = signal(SignalKind::interrupt())?;
            let mut terminate = signal(SignalKind::terminate())?;
            tokio::spawn(async move {
                loop {
                    let received = tokio::select! {
                        res = interrupt.recv() => match res {
                            Some(()) => Signal::Interrupt,
                            None => break,
                        },
                        res = terminate.recv() => match res {
                            Some(()) => Signal::Terminate,
                            None => break,
                        },
                    };
                    trigger.deliver(received);
                }
                tracing::warn!("OS signal streams closed");
            });
        }

        #[cfg(windows)]
        {
            let mut interrupt = tokio::signal::windows::ctrl_c()?;
            tokio::spawn(async move {
                while interrupt.recv().await.is_some() {
                    trigger.deliver(Signal::Interrupt);
                }
            });
        }

        Ok(termination)
    }

    /// Another trigger bound to this channel.
    pub fn trigger(&self) -> SignalTrigger {
        SignalTrigger {
            tx: self.tx.clone(),
        }
    }

    /// Wait for the next termination request.
    pub async fn recv(&mut self) -> Signal {
        // `self.tx` keeps the channel open, so `None` is unreachable in practice.
        self.rx.recv().await.unwrap_or(Signal::Terminate)
    }
}

/// Delivers termination requests into a [`Termination`].
#[derive(Clone)]
pub struct SignalTrigger {
    tx: mpsc::Sender<Signal>,
}

impl SignalTrigger {
    /// Deliver a signal. Returns `false` when one is already pending.
    pub fn deliver(&self, signal: Signal) -> bool {
        match self.tx.try_send(signal) {
            Ok(()) => {
                tracing::info!(%signal, "Termination signal delivered");
                true
            }
            Err(_) => {
                tracing::debug!(%signal, "Termination already pending, signal dropped");
                false
            }
        }
    }
}
