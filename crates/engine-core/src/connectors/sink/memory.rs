use crate::{
    connectors::sink::{UpsertOutcome, UpsertSink},
    error::SinkError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::records::DomainRecord;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow<R> {
    pub record: R,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity-keyed in-memory store, used by tests and dry runs.
///
/// Identities registered through [`MemorySink::fail_on`] make `upsert` return
/// an error, which lets tests exercise per-record failure handling.
pub struct MemorySink<R> {
    rows: RwLock<HashMap<String, StoredRow<R>>>,
    failing: RwLock<HashSet<String>>,
}

impl<R: DomainRecord> Default for MemorySink<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
        }
    }
}

impl<R: DomainRecord> MemorySink<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_on(&self, identity: impl Into<String>) {
        self.failing.write().await.insert(identity.into());
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    pub async fn get(&self, identity: &str) -> Option<StoredRow<R>> {
        self.rows.read().await.get(identity).cloned()
    }

    pub async fn identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.rows.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl<R: DomainRecord> UpsertSink<R> for MemorySink<R> {
    async fn upsert(&self, record: &R) -> Result<UpsertOutcome, SinkError> {
        let identity = record.identity();
        if self.failing.read().await.contains(identity) {
            return Err(SinkError::Other(format!("rejected write for {identity}")));
        }

        let now = Utc::now();
        let updated_at = record.updated_at().unwrap_or(now);
        let mut rows = self.rows.write().await;

        match rows.get_mut(identity) {
            Some(row) => {
                row.record = record.clone();
                row.updated_at = updated_at;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                rows.insert(
                    identity.to_string(),
                    StoredRow {
                        record: record.clone(),
                        created_at: now,
                        updated_at,
                    },
                );
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}
