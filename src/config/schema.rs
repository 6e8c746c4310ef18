//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the keeper server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeeperConfig {
    /// Persistent store location.
    pub storage: StorageConfig,

    /// Network endpoints started and stopped by the keeper.
    pub endpoints: Vec<EndpointConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            endpoints: vec![EndpointConfig::default()],
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding all durable state.
    pub path: String,

    /// Name of the lock file inside `path` guarding exclusive access.
    pub lock_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./data".to_string(),
            lock_file: "keeper.lock".to_string(),
        }
    }
}

/// A single web endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Endpoint identifier for logging/metrics.
    pub name: String,

    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            name: "web".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            tls: None,
        }
    }
}

/// TLS configuration for an endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
