use crate::{
    crawl::options::CrawlOptions,
    error::CrawlError,
    normalize::RecordNormalizer,
    rejected::{RejectedItem, RejectedItemWriter},
    throttle::Throttle,
};
use chrono::Utc;
use engine_config::report::summary::{RunOutcome, RunSummary};
use engine_core::{
    connectors::{
        fetcher::PageFetcher,
        sink::{UpsertOutcome, UpsertSink},
    },
    metrics::CrawlMetrics,
    state::{StateStore, manager::CheckpointManager},
};
use model::{
    geo::{CellId, GridCell, partition},
    records::{DomainRecord, RawItem},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How processing of one cell ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellOutcome {
    Completed,
    Cancelled,
}

/// Sequential grid crawl: one cell, one page, one item at a time.
///
/// Cells are visited in partition order. Each cell is paginated until the
/// fetcher reports no more pages, returns an empty page, or the per-cell page
/// ceiling is reached. The checkpoint is saved after every page and every
/// completed cell, so a restarted run skips completed cells and re-fetches
/// the page it was on. Re-fetched records are absorbed by the sink's
/// identity-keyed upsert.
pub struct CrawlEngine<R: DomainRecord> {
    options: CrawlOptions,
    fetcher: Arc<dyn PageFetcher>,
    normalizer: Arc<dyn RecordNormalizer<R>>,
    sink: Arc<dyn UpsertSink<R>>,
    state: Arc<dyn StateStore>,
    rejected: Option<Arc<RejectedItemWriter>>,
    metrics: CrawlMetrics,
    cancel: CancellationToken,
}

impl<R: DomainRecord> CrawlEngine<R> {
    pub fn new(
        options: CrawlOptions,
        fetcher: Arc<dyn PageFetcher>,
        normalizer: Arc<dyn RecordNormalizer<R>>,
        sink: Arc<dyn UpsertSink<R>>,
        state: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            options,
            fetcher,
            normalizer,
            sink,
            state,
            rejected: None,
            metrics: CrawlMetrics::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_rejected_writer(mut self, writer: Arc<RejectedItemWriter>) -> Self {
        self.rejected = Some(writer);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn metrics(&self) -> CrawlMetrics {
        self.metrics.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Runs until every cell is completed or cancellation is requested.
    ///
    /// A fetch failure ends the run with [`CrawlError::Fetch`] and leaves the
    /// checkpoint where it was, so the next run retries the same page.
    pub async fn run(self) -> Result<RunSummary, CrawlError> {
        let started_at = Utc::now();
        let mut checkpoint = if self.options.resume {
            CheckpointManager::load(self.state.clone(), self.options.grid_size).await?
        } else {
            info!("Fresh start requested, ignoring stored checkpoint");
            CheckpointManager::fresh(self.state.clone(), self.options.grid_size)
        };

        let grid_size = checkpoint.checkpoint().grid_size;
        let cells = partition(&self.options.region, grid_size)?;
        info!(
            region = %self.options.region,
            grid_size,
            cells = cells.len(),
            completed = checkpoint.checkpoint().completed_cells.len(),
            "Starting crawl"
        );

        let mut throttle = Throttle::new(self.options.page_delay);
        let mut outcome = RunOutcome::Completed;

        for cell in &cells {
            if checkpoint.checkpoint().is_completed(&cell.id) {
                continue;
            }
            if self.cancel.is_cancelled() {
                outcome = RunOutcome::Cancelled;
                break;
            }

            let start_page = checkpoint.checkpoint().resume_page(&cell.id);
            self.metrics.cell_visited();
            info!(
                cell = %cell.id,
                ordinal = cell.id.ordinal(grid_size) + 1,
                of = cells.len(),
                start_page,
                region = %cell.region,
                "Processing cell"
            );

            match self
                .crawl_cell(cell, start_page, &mut checkpoint, &mut throttle)
                .await?
            {
                CellOutcome::Completed => self.metrics.cell_completed(),
                CellOutcome::Cancelled => {
                    outcome = RunOutcome::Cancelled;
                    break;
                }
            }
        }

        let cp = checkpoint.checkpoint();
        let summary = RunSummary::new(
            outcome,
            grid_size,
            cp.completed_cells.len(),
            cp.total_records_processed,
            &self.metrics.snapshot(),
            started_at,
        );

        match outcome {
            RunOutcome::Completed => info!(
                cells = summary.cells_completed,
                records = summary.records_processed,
                skipped = summary.skipped_total(),
                "Crawl completed"
            ),
            RunOutcome::Cancelled => warn!(
                cells = summary.cells_completed,
                of = summary.cells_total,
                records = summary.records_processed,
                "Crawl cancelled, progress saved"
            ),
        }

        Ok(summary)
    }

    async fn crawl_cell(
        &self,
        cell: &GridCell,
        start_page: u32,
        checkpoint: &mut CheckpointManager,
        throttle: &mut Throttle,
    ) -> Result<CellOutcome, CrawlError> {
        let max_pages = self.options.max_pages_per_cell;
        if start_page >= max_pages {
            warn!(cell = %cell.id, page = start_page, max_pages, "Page ceiling reached, closing cell");
            checkpoint.mark_cell_done(cell.id, 0).await?;
            return Ok(CellOutcome::Completed);
        }

        let mut page = start_page;
        loop {
            if !throttle.wait(&self.cancel).await {
                return Ok(CellOutcome::Cancelled);
            }

            let fetched = match self.fetcher.fetch(&cell.region, page).await {
                Ok(fetched) => fetched,
                Err(source) => {
                    error!(cell = %cell.id, page, error = %source, "Page fetch failed");
                    return Err(CrawlError::Fetch {
                        cell: cell.id,
                        page,
                        source,
                    });
                }
            };
            self.metrics.page_fetched(fetched.items.len());

            if fetched.is_empty() {
                debug!(cell = %cell.id, page, "Empty page, cell exhausted");
                checkpoint.mark_cell_done(cell.id, 0).await?;
                return Ok(CellOutcome::Completed);
            }

            let accepted = self.apply_page(cell.id, page, &fetched.items).await;
            debug!(cell = %cell.id, page, items = fetched.items.len(), accepted, "Page applied");

            let ceiling = page + 1 >= max_pages;
            if !fetched.has_more || ceiling {
                if fetched.has_more {
                    warn!(cell = %cell.id, page, max_pages, "Page ceiling reached, closing cell");
                }
                checkpoint.mark_cell_done(cell.id, accepted).await?;
                return Ok(CellOutcome::Completed);
            }

            checkpoint.mark_page_done(cell.id, page, accepted).await?;
            page += 1;

            if self.cancel.is_cancelled() {
                return Ok(CellOutcome::Cancelled);
            }
        }
    }

    /// Normalizes and upserts every item. Returns how many records the sink
    /// accepted; failed items are logged, counted and skipped.
    async fn apply_page(&self, cell: CellId, page: u32, items: &[RawItem]) -> u64 {
        let mut accepted = 0;

        for raw in items {
            let mut record = match self.normalizer.normalize(raw) {
                Ok(record) => record,
                Err(err) => {
                    self.metrics.validation_skipped();
                    warn!(
                        %cell,
                        page,
                        id = ?raw.id_hint(),
                        kind = err.kind(),
                        reason = %err,
                        payload = %raw.to_log_string(),
                        "Skipping invalid item"
                    );
                    if let Some(writer) = &self.rejected {
                        let entry = RejectedItem::new(cell, page, raw, &err);
                        if let Err(e) = writer.write(&entry).await {
                            warn!(error = %e, "Failed to record rejected item");
                        }
                    }
                    continue;
                }
            };

            record.touch(Utc::now());
            match self.sink.upsert(&record).await {
                Ok(UpsertOutcome::Inserted) => {
                    self.metrics.record_inserted();
                    accepted += 1;
                }
                Ok(UpsertOutcome::Updated) => {
                    self.metrics.record_updated();
                    accepted += 1;
                }
                Err(err) => {
                    self.metrics.store_skipped();
                    warn!(%cell, page, id = record.identity(), error = %err, "Failed to store record");
                }
            }
        }

        accepted
    }
}
