//! Directory-backed store with an exclusive lock file.
//!
//! Opening creates the data directory, takes an advisory exclusive lock on
//! the lock file and writes this instance's id into it. Closing releases the
//! lock and removes the file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fs2::FileExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::storage::{Store, StoreBackend, StorageError};

/// Opens [`FileStore`]s from a [`StorageConfig`].
pub struct FileBackend {
    config: StorageConfig,
}

impl FileBackend {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreBackend for FileBackend {
    async fn open(&self) -> Result<Arc<dyn Store>, StorageError> {
        let store = FileStore::open(Path::new(&self.config.path), &self.config.lock_file)?;
        Ok(Arc::new(store))
    }
}

/// An open data directory.
pub struct FileStore {
    dir: PathBuf,
    lock_path: PathBuf,
    instance_id: Uuid,
    lock: Mutex<Option<File>>,
}

impl FileStore {
    /// Open the store rooted at `dir`, locking `dir/lock_file`.
    pub fn open(dir: &Path, lock_file: &str) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let lock_path = dir.join(lock_file);
        let io_err = |source| StorageError::Io {
            path: lock_path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(io_err)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked(lock_path));
        }

        let instance_id = Uuid::new_v4();
        file.set_len(0).map_err(io_err)?;
        writeln!(file, "{instance_id}").map_err(io_err)?;
        file.sync_all().map_err(io_err)?;

        tracing::info!(
            path = ?dir,
            instance_id = %instance_id,
            "Store opened"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            lock_path,
            instance_id,
            lock: Mutex::new(Some(file)),
        })
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Id written into the lock file by this instance.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }
}

#[async_trait]
impl Store for FileStore {
    async fn close(&self) -> Result<(), StorageError> {
        let Some(file) = self.lock.lock().await.take() else {
            tracing::debug!(path = ?self.dir, "Store already closed");
            return Ok(());
        };

        // Remove while still holding the lock so no other opener sees a stale id.
        let removed = fs::remove_file(&self.lock_path);
        let unlocked = FileExt::unlock(&file);
        drop(file);

        removed.map_err(|source| StorageError::Io {
            path: self.lock_path.clone(),
            source,
        })?;
        unlocked.map_err(|source| StorageError::Io {
            path: self.lock_path.clone(),
            source,
        })?;

        tracing::info!(path = ?self.dir, "Store closed");
        Ok(())
    }
}
