use crate::{
    error::StateStoreError,
    state::{StateStore, models::Checkpoint},
};
use model::geo::CellId;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns the in-memory checkpoint and is the only writer to the store.
///
/// Every mutation builds the next checkpoint, persists it through
/// [`CheckpointManager::save`], and only then replaces the in-memory copy.
/// A failed save leaves both the stored and the in-memory state untouched.
pub struct CheckpointManager {
    store: Arc<dyn StateStore>,
    current: Checkpoint,
}

impl CheckpointManager {
    /// Loads the stored checkpoint for `grid_size`.
    ///
    /// Falls back to an empty checkpoint when nothing is stored, when the
    /// stored grid size differs, or when the stored document cannot be read.
    /// Only I/O failures are returned as errors.
    pub async fn load(
        store: Arc<dyn StateStore>,
        grid_size: usize,
    ) -> Result<Self, StateStoreError> {
        let current = match store.load_checkpoint().await {
            Ok(Some(cp)) if cp.grid_size == grid_size => {
                info!(
                    completed = cp.completed_cells.len(),
                    current_cell = ?cp.current_cell,
                    current_page = cp.current_page,
                    total = cp.total_records_processed,
                    "Resuming from checkpoint"
                );
                cp
            }
            Ok(Some(cp)) => {
                warn!(
                    stored = cp.grid_size,
                    requested = grid_size,
                    "Checkpoint grid size mismatch, starting fresh"
                );
                Checkpoint::empty(grid_size)
            }
            Ok(None) => {
                debug!(store = %store.describe(), "No checkpoint found");
                Checkpoint::empty(grid_size)
            }
            Err(StateStoreError::Corrupt(reason)) => {
                warn!(%reason, "Stored checkpoint is unreadable, starting fresh");
                Checkpoint::empty(grid_size)
            }
            Err(e) => return Err(e),
        };

        Ok(Self { store, current })
    }

    /// Starts from an empty checkpoint, ignoring anything stored.
    pub fn fresh(store: Arc<dyn StateStore>, grid_size: usize) -> Self {
        Self {
            store,
            current: Checkpoint::empty(grid_size),
        }
    }

    pub fn checkpoint(&self) -> &Checkpoint {
        &self.current
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Single write path: persists `next` atomically, then adopts it.
    pub async fn save(&mut self, next: Checkpoint) -> Result<(), StateStoreError> {
        self.store.save_checkpoint(&next).await?;
        self.current = next;
        Ok(())
    }

    /// Records that `page` of `cell` has been applied with `records` accepted.
    ///
    /// `current_page` stays at `page` rather than `page + 1`, so a resume
    /// re-fetches it and its records are counted again.
    pub async fn mark_page_done(
        &mut self,
        cell: CellId,
        page: u32,
        records: u64,
    ) -> Result<(), StateStoreError> {
        let mut next = self.current.clone();
        next.current_cell = Some(cell);
        next.current_page = page;
        next.total_records_processed += records;
        self.save(next).await
    }

    /// Moves `cell` into the completed set. `records` is the count from the
    /// cell's final page.
    pub async fn mark_cell_done(
        &mut self,
        cell: CellId,
        records: u64,
    ) -> Result<(), StateStoreError> {
        let mut next = self.current.clone();
        next.completed_cells.insert(cell);
        next.current_cell = None;
        next.current_page = 0;
        next.total_records_processed += records;
        self.save(next).await
    }
}
