use engine_core::error::{FetchError, StateStoreError};
use model::{errors::GeoError, geo::CellId};
use thiserror::Error;

/// Reasons a crawl run stops early. Item and record failures never show up
/// here; they are counted and skipped.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Invalid crawl grid: {0}")]
    Grid(#[from] GeoError),

    #[error("Checkpoint store failed: {0}")]
    Checkpoint(#[from] StateStoreError),

    /// Fetching gave up; the checkpoint still points at this page.
    #[error("Fetching page {page} of cell {cell} failed: {source}")]
    Fetch {
        cell: CellId,
        page: u32,
        #[source]
        source: FetchError,
    },
}
