use crate::{
    error::StateStoreError,
    state::{StateStore, models::Checkpoint},
};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// In-process store. Keeps every saved version so tests can inspect the
/// sequence of writes.
#[derive(Default)]
pub struct MemoryStateStore {
    inner: Mutex<Vec<Checkpoint>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checkpoint(cp: Checkpoint) -> Self {
        Self {
            inner: Mutex::new(vec![cp]),
        }
    }

    pub async fn history(&self) -> Vec<Checkpoint> {
        self.inner.lock().await.clone()
    }

    pub async fn save_count(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_checkpoint(&self) -> Result<Option<Checkpoint>, StateStoreError> {
        Ok(self.inner.lock().await.last().cloned())
    }

    async fn save_checkpoint(&self, cp: &Checkpoint) -> Result<(), StateStoreError> {
        self.inner.lock().await.push(cp.clone());
        Ok(())
    }

    async fn clear_checkpoint(&self) -> Result<(), StateStoreError> {
        self.inner.lock().await.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
