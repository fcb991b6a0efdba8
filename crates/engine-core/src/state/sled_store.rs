use crate::{
    error::StateStoreError,
    state::{StateStore, models::Checkpoint},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const CHECKPOINT_KEY: &str = "chk:crawl";

/// Checkpoint held under a single key of an embedded sled database.
///
/// A single-key insert is atomic in sled; the tree is flushed after each save.
pub struct SledStateStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStateStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StateStoreError> {
        let db = sled::open(path.as_ref())?;
        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }
}

#[async_trait]
impl StateStore for SledStateStore {
    async fn load_checkpoint(&self) -> Result<Option<Checkpoint>, StateStoreError> {
        match self.db.get(CHECKPOINT_KEY)? {
            Some(bytes) => bincode::deserialize(&bytes)
                .map(Some)
                .map_err(|e| StateStoreError::Corrupt(e.to_string())),
            None => Ok(None),
        }
    }

    async fn save_checkpoint(&self, cp: &Checkpoint) -> Result<(), StateStoreError> {
        let bytes = bincode::serialize(cp).map_err(|e| StateStoreError::Encode(e.to_string()))?;
        self.db.insert(CHECKPOINT_KEY, bytes)?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn clear_checkpoint(&self) -> Result<(), StateStoreError> {
        self.db.remove(CHECKPOINT_KEY)?;
        self.db.flush_async().await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sled {}", self.path.display())
    }
}
