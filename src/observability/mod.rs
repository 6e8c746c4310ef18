//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Keeper, service units, store:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Unit failures are reported here, never through the keeper's result
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
