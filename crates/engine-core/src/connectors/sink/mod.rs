use crate::error::SinkError;
use async_trait::async_trait;
use model::records::DomainRecord;

pub mod memory;
pub mod postgres;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Insert-or-update keyed on [`DomainRecord::identity`].
///
/// An incoming record whose identity is already stored overwrites every field
/// of the stored row except its identity and creation time. Calling `upsert`
/// twice with the same record leaves a single row.
#[async_trait]
pub trait UpsertSink<R: DomainRecord>: Send + Sync {
    async fn upsert(&self, record: &R) -> Result<UpsertOutcome, SinkError>;
}
