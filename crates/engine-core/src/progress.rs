use crate::{
    error::ProgressError,
    state::{StateStore, models::Checkpoint},
};
use model::geo::CellId;
use serde::Serialize;
use std::{fmt, sync::Arc};

/// Read-only view of crawl progress derived from the stored checkpoint.
#[derive(Clone)]
pub struct ProgressService {
    pub store: Arc<dyn StateStore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressStage {
    /// No checkpoint stored.
    Idle,
    Running,
    Done,
}

impl ProgressStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStage::Idle => "Idle",
            ProgressStage::Running => "Running",
            ProgressStage::Done => "Done",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressStatus {
    pub stage: ProgressStage,
    pub grid_size: usize,
    pub cells_total: usize,
    pub cells_completed: usize,
    pub current_cell: Option<CellId>,
    pub current_page: u32,
    pub total_records_processed: u64,
}

impl ProgressStatus {
    pub fn from_checkpoint(cp: &Checkpoint) -> Self {
        let cells_total = cp.grid_size.saturating_mul(cp.grid_size);
        let cells_completed = cp.completed_cells.len();
        let stage = if cells_total > 0 && cells_completed >= cells_total {
            ProgressStage::Done
        } else {
            ProgressStage::Running
        };

        ProgressStatus {
            stage,
            grid_size: cp.grid_size,
            cells_total,
            cells_completed,
            current_cell: cp.current_cell,
            current_page: cp.current_page,
            total_records_processed: cp.total_records_processed,
        }
    }

    fn idle() -> Self {
        ProgressStatus {
            stage: ProgressStage::Idle,
            grid_size: 0,
            cells_total: 0,
            cells_completed: 0,
            current_cell: None,
            current_page: 0,
            total_records_processed: 0,
        }
    }

    /// Completed share of the grid in percent.
    pub fn percent(&self) -> f64 {
        if self.cells_total == 0 {
            return 0.0;
        }
        self.cells_completed as f64 * 100.0 / self.cells_total as f64
    }
}

impl ProgressService {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        ProgressService { store }
    }

    pub async fn status(&self) -> Result<ProgressStatus, ProgressError> {
        Ok(match self.store.load_checkpoint().await? {
            Some(cp) => ProgressStatus::from_checkpoint(&cp),
            None => ProgressStatus::idle(),
        })
    }
}
