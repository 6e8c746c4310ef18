//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → KeeperConfig (validated, immutable)
//!     → handed to lifecycle::startup for wiring
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::EndpointConfig;
pub use schema::KeeperConfig;
pub use schema::ObservabilityConfig;
pub use schema::StorageConfig;
pub use schema::TlsConfig;
pub use validation::ValidationError;
