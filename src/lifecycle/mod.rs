//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → store backend + units → Keeper::new (opens store)
//!
//! Run (orchestrator.rs):
//!     start units concurrently → wait for signal → stop units concurrently
//!     → drain in-flight operations (inflight.rs) → close store
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → termination channel (first delivery wins)
//!
//! Shutdown (shutdown.rs):
//!     latched flag each unit uses to end its serve loop
//! ```
//!
//! # Design Decisions
//! - Startup is best-effort: a unit that fails to start does not stop the others
//! - Shutdown is best-effort: a unit that fails to stop does not block the store close
//! - No deadlines: every start and stop runs to its own completion

pub mod inflight;
pub mod orchestrator;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use inflight::{InFlight, InFlightGuard};
pub use orchestrator::{Keeper, KeeperError, LifecycleState};
pub use shutdown::Shutdown;
pub use signals::{Signal, SignalTrigger, Termination};
