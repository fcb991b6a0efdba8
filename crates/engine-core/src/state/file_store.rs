use crate::{
    error::StateStoreError,
    state::{StateStore, models::Checkpoint},
};
use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

/// Keeps the checkpoint as a pretty-printed JSON document on disk.
///
/// Writes go to a sibling temp file which is fsynced and then renamed over
/// the target, so readers only ever see a complete document.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load_checkpoint(&self) -> Result<Option<Checkpoint>, StateStoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StateStoreError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    async fn save_checkpoint(&self, cp: &Checkpoint) -> Result<(), StateStoreError> {
        let body =
            serde_json::to_vec_pretty(cp).map_err(|e| StateStoreError::Encode(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "Checkpoint saved");
        Ok(())
    }

    async fn clear_checkpoint(&self) -> Result<(), StateStoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
