//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoint names and bind addresses are unique
//! - Addresses parse, paths are non-empty, log level is known
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: KeeperConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::KeeperConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("storage path must not be empty")]
    EmptyStoragePath,

    #[error("storage lock file name must not be empty")]
    EmptyLockFile,

    #[error("endpoint #{index} has an empty name")]
    EmptyEndpointName { index: usize },

    #[error("endpoint name '{0}' is used more than once")]
    DuplicateEndpointName(String),

    #[error("endpoint '{name}' has invalid bind address '{address}'")]
    InvalidBindAddress { name: String, address: String },

    #[error("bind address '{0}' is used by more than one endpoint")]
    DuplicateBindAddress(String),

    #[error("endpoint '{0}' must have a request timeout greater than zero")]
    ZeroRequestTimeout(String),

    #[error("endpoint '{0}' has TLS enabled with an empty certificate or key path")]
    IncompleteTls(String),

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &KeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.storage.path.trim().is_empty() {
        errors.push(ValidationError::EmptyStoragePath);
    }
    if config.storage.lock_file.trim().is_empty() {
        errors.push(ValidationError::EmptyLockFile);
    }

    let mut names = HashSet::new();
    let mut addresses = HashSet::new();
    for (index, endpoint) in config.endpoints.iter().enumerate() {
        if endpoint.name.trim().is_empty() {
            errors.push(ValidationError::EmptyEndpointName { index });
        } else if !names.insert(endpoint.name.as_str()) {
            errors.push(ValidationError::DuplicateEndpointName(endpoint.name.clone()));
        }

        match endpoint.bind_address.parse::<SocketAddr>() {
            Ok(addr) => {
                // Port 0 asks the OS for a fresh port, so it never collides.
                if addr.port() != 0 && !addresses.insert(addr) {
                    errors.push(ValidationError::DuplicateBindAddress(
                        endpoint.bind_address.clone(),
                    ));
                }
            }
            Err(_) => errors.push(ValidationError::InvalidBindAddress {
                name: endpoint.name.clone(),
                address: endpoint.bind_address.clone(),
            }),
        }

        if endpoint.request_timeout_secs == 0 {
            errors.push(ValidationError::ZeroRequestTimeout(endpoint.name.clone()));
        }

        if let Some(tls) = &endpoint.tls {
            if tls.cert_path.trim().is_empty() || tls.key_path.trim().is_empty() {
                errors.push(ValidationError::IncompleteTls(endpoint.name.clone()));
            }
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
