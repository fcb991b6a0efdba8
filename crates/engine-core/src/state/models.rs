use model::geo::CellId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Persisted crawl progress.
///
/// `completed_cells` is a `BTreeSet` so the stored document lists cells in
/// visitation order and serializes identically for identical state.
///
/// `total_records_processed` counts page applications, not distinct records.
/// Resuming re-applies `current_page` of `current_cell`, so every resume can
/// add up to one page of records a second time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub grid_size: usize,
    pub completed_cells: BTreeSet<CellId>,
    pub current_cell: Option<CellId>,
    pub current_page: u32,
    pub total_records_processed: u64,
}

impl Checkpoint {
    pub fn empty(grid_size: usize) -> Self {
        Checkpoint {
            grid_size,
            completed_cells: BTreeSet::new(),
            current_cell: None,
            current_page: 0,
            total_records_processed: 0,
        }
    }

    pub fn is_completed(&self, cell: &CellId) -> bool {
        self.completed_cells.contains(cell)
    }

    /// Page to start `cell` at: the recorded page when `cell` is the one that
    /// was in progress, otherwise 0.
    pub fn resume_page(&self, cell: &CellId) -> u32 {
        match self.current_cell {
            Some(current) if current == *cell && !self.is_completed(cell) => self.current_page,
            _ => 0,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.completed_cells.is_empty()
            && self.current_cell.is_none()
            && self.total_records_processed == 0
    }
}
