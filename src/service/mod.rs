//! Service unit contract.
//!
//! A service unit is any independently startable and stoppable endpoint
//! managed by the keeper. The keeper only sees this trait; concrete
//! implementations (see `crate::web`) are registered at construction.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a service unit can report from `start` or `stop`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Failed to bind the listening socket.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport security material could not be loaded.
    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),

    /// The unit failed while serving.
    #[error("serve error: {0}")]
    Serve(#[source] std::io::Error),

    /// `start` was called on a unit that was already started.
    #[error("unit already started")]
    AlreadyStarted,

    #[error("{0}")]
    Other(String),
}

/// A uniformly startable/stoppable subsystem.
#[async_trait]
pub trait ServiceUnit: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &str;

    /// Start the unit. May run until the unit stops serving.
    async fn start(&self) -> Result<(), ServiceError>;

    /// Ask the unit to stop. Must eventually return.
    async fn stop(&self) -> Result<(), ServiceError>;
}
