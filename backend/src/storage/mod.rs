//! Snapshot storage
//!
//! The application keeps exactly two records: the entry log and the user
//! profile. Each is written as a full JSON snapshot under its own key on
//! every mutation, so a backend only needs keyed get and set.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};

mod file;
mod memory;
mod redis;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Storage failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Durable key-value storage for whole-record snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Snapshot stored under `key`, or `None` if nothing was ever saved
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the snapshot under `key`
    async fn save(&self, key: &str, snapshot: &str) -> Result<(), StoreError>;

    /// Check the backend can currently serve reads and writes
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Open the backend selected in configuration
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn SnapshotStore>, StoreError> {
    let store: Arc<dyn SnapshotStore> = match config.backend {
        StorageBackend::File => Arc::new(FileStore::open(&config.data_dir).await?),
        StorageBackend::Redis => Arc::new(RedisStore::connect(&config.redis_url).await?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    info!(backend = store.name(), "Snapshot store ready");
    Ok(store)
}
