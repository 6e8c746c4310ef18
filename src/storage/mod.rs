//! Persistent store subsystem.
//!
//! # Data Flow
//! ```text
//! StoreBackend::open()   (once, before any unit starts)
//!     → Arc<dyn Store>   (owned by the keeper)
//!     → Store::close()   (once, after every start/stop has drained)
//! ```
//!
//! The keeper never looks inside the store; it only opens and closes it.

pub mod file;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use file::{FileBackend, FileStore};

/// Errors raised while opening or closing a store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store at {0:?} is locked by another process")]
    Locked(PathBuf),

    #[error("{0}")]
    Other(String),
}

/// An open store handle.
#[async_trait]
pub trait Store: Send + Sync {
    /// Release the store. Called once at shutdown.
    async fn close(&self) -> Result<(), StorageError>;
}

/// Something that can open a [`Store`].
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn open(&self) -> Result<Arc<dyn Store>, StorageError>;
}
