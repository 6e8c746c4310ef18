//! Keeper server library.
//!
//! Brings up a set of network endpoints around one persistent store, waits
//! for SIGINT/SIGTERM and shuts everything down in order.

pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod service;
pub mod storage;
pub mod web;

pub use config::schema::KeeperConfig;
pub use lifecycle::{Keeper, KeeperError};
pub use service::{ServiceError, ServiceUnit};
pub use storage::{Store, StoreBackend};
