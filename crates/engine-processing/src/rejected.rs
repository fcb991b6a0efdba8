use chrono::{DateTime, Utc};
use model::{errors::ValidationError, geo::CellId, records::RawItem};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};
use tracing::debug;

#[derive(Error, Debug)]
pub enum RejectedItemWriterError {
    #[error("Failed to write rejected item: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize rejected item: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One line of the rejected items file.
#[derive(Serialize, Debug, Clone)]
pub struct RejectedItem {
    pub cell: CellId,
    pub page: u32,
    pub reason: String,
    pub kind: &'static str,
    pub payload: Value,
    pub rejected_at: DateTime<Utc>,
}

impl RejectedItem {
    pub fn new(cell: CellId, page: u32, raw: &RawItem, err: &ValidationError) -> Self {
        let payload = match raw {
            RawItem::Json(value) => value.clone(),
            RawItem::Bytes(_) => Value::String(raw.to_log_string()),
        };
        RejectedItem {
            cell,
            page,
            reason: err.to_string(),
            kind: err.kind(),
            payload,
            rejected_at: Utc::now(),
        }
    }
}

/// Appends items the normalizer refused to a JSONL file for later inspection.
pub struct RejectedItemWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RejectedItemWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, item: &RejectedItem) -> Result<(), RejectedItemWriterError> {
        let mut line = serde_json::to_vec(item)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        debug!(cell = %item.cell, page = item.page, path = %self.path.display(), "Wrote rejected item");
        Ok(())
    }
}
