//! Startup wiring.
//!
//! # Responsibilities
//! - Turn a validated config into a store backend and service units
//! - Subscribe to OS termination signals
//! - Construct the keeper (opening the store)
//!
//! # Design Decisions
//! - Fail fast: a store that cannot be opened is fatal
//! - Units are registered in config order

use std::sync::Arc;

use crate::config::KeeperConfig;
use crate::lifecycle::orchestrator::{Keeper, KeeperError};
use crate::lifecycle::signals::Termination;
use crate::service::ServiceUnit;
use crate::storage::FileBackend;
use crate::web::WebEndpoint;

/// One web endpoint per configured endpoint, in config order.
pub fn build_units(config: &KeeperConfig) -> Vec<Arc<dyn ServiceUnit>> {
    config
        .endpoints
        .iter()
        .cloned()
        .map(|endpoint| Arc::new(WebEndpoint::new(endpoint)) as Arc<dyn ServiceUnit>)
        .collect()
}

/// Build a keeper from config with the given termination source.
pub async fn build_keeper(
    config: &KeeperConfig,
    termination: Termination,
) -> Result<Keeper, KeeperError> {
    let backend = FileBackend::new(config.storage.clone());
    Keeper::new(&backend, build_units(config), termination).await
}

/// Build a keeper that terminates on SIGINT/SIGTERM.
pub async fn build_os_keeper(config: &KeeperConfig) -> Result<Keeper, Box<dyn std::error::Error>> {
    let termination = Termination::os()?;
    Ok(build_keeper(config, termination).await?)
}
