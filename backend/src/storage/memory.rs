//! In-process store for tests and throwaway runs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SnapshotStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `key` → `snapshot`
    pub fn with_snapshot(key: &str, snapshot: &str) -> Self {
        let mut snapshots = HashMap::new();
        snapshots.insert(key.to_string(), snapshot.to_string());
        Self {
            snapshots: RwLock::new(snapshots),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every following `save` fail, to exercise write-failure paths
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "writes disabled",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.snapshots.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, snapshot: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.snapshots
            .write()
            .await
            .insert(key.to_string(), snapshot.to_string());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.check_writable()
    }
}
