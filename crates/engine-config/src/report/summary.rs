use chrono::{DateTime, Utc};
use engine_core::metrics::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every cell of the grid is in the completed set.
    Completed,
    /// The run stopped on request; the checkpoint allows resuming.
    Cancelled,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed => f.write_str("completed"),
            RunOutcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// What a crawl run reports when it ends.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub grid_size: usize,
    pub cells_total: usize,
    pub cells_visited: u64,
    pub cells_completed: usize,
    pub pages_fetched: u64,
    pub items_fetched: u64,
    /// Running total kept in the checkpoint, across resumed runs. A resume
    /// re-fetches the interrupted page, so this can exceed the distinct record
    /// count by up to one page per resume.
    pub records_processed: u64,
    /// Records accepted by the sink during this run.
    pub records_upserted: u64,
    pub inserted: u64,
    pub updated: u64,
    pub skipped_validation: u64,
    pub skipped_store: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn new(
        outcome: RunOutcome,
        grid_size: usize,
        cells_completed: usize,
        records_processed: u64,
        metrics: &MetricsSnapshot,
        started_at: DateTime<Utc>,
    ) -> Self {
        let elapsed_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;
        RunSummary {
            outcome,
            grid_size,
            cells_total: grid_size.saturating_mul(grid_size),
            cells_visited: metrics.cells_visited,
            cells_completed,
            pages_fetched: metrics.pages_fetched,
            items_fetched: metrics.items_fetched,
            records_processed,
            records_upserted: metrics.records_upserted(),
            inserted: metrics.records_inserted,
            updated: metrics.records_updated,
            skipped_validation: metrics.skipped_validation,
            skipped_store: metrics.skipped_store,
            started_at,
            elapsed_ms,
        }
    }

    pub fn skipped_total(&self) -> u64 {
        self.skipped_validation + self.skipped_store
    }
}
