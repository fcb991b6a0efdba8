use crate::{error::StateStoreError, state::models::Checkpoint};
use async_trait::async_trait;

pub mod file_store;
pub mod manager;
pub mod memory_store;
pub mod models;
pub mod sled_store;

/// Durable home of the crawl checkpoint.
///
/// `save_checkpoint` must replace the stored document atomically: after a
/// crash, `load_checkpoint` returns either the previous or the new
/// checkpoint, never a mix of both.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load_checkpoint(&self) -> Result<Option<Checkpoint>, StateStoreError>;
    async fn save_checkpoint(&self, cp: &Checkpoint) -> Result<(), StateStoreError>;
    async fn clear_checkpoint(&self) -> Result<(), StateStoreError>;

    /// Where the checkpoint lives, for log lines and the CLI.
    fn describe(&self) -> String;
}
