use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    cells_visited: AtomicU64,
    cells_completed: AtomicU64,
    pages_fetched: AtomicU64,
    items_fetched: AtomicU64,
    records_inserted: AtomicU64,
    records_updated: AtomicU64,
    skipped_validation: AtomicU64,
    skipped_store: AtomicU64,
}

/// Counters for one crawl run. Cheap to clone; all clones share state.
#[derive(Debug, Clone, Default)]
pub struct CrawlMetrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cells_visited: u64,
    pub cells_completed: u64,
    pub pages_fetched: u64,
    pub items_fetched: u64,
    pub records_inserted: u64,
    pub records_updated: u64,
    pub skipped_validation: u64,
    pub skipped_store: u64,
}

impl MetricsSnapshot {
    pub fn records_upserted(&self) -> u64 {
        self.records_inserted + self.records_updated
    }
}

impl CrawlMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell_visited(&self) {
        self.inner.cells_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cell_completed(&self) {
        self.inner.cells_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn page_fetched(&self, items: usize) {
        self.inner.pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.inner
            .items_fetched
            .fetch_add(items as u64, Ordering::Relaxed);
    }

    pub fn record_inserted(&self) {
        self.inner.records_inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_updated(&self) {
        self.inner.records_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn validation_skipped(&self) {
        self.inner.skipped_validation.fetch_add(1, Ordering::Relaxed);
    }

    pub fn store_skipped(&self) {
        self.inner.skipped_store.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cells_visited: self.inner.cells_visited.load(Ordering::Relaxed),
            cells_completed: self.inner.cells_completed.load(Ordering::Relaxed),
            pages_fetched: self.inner.pages_fetched.load(Ordering::Relaxed),
            items_fetched: self.inner.items_fetched.load(Ordering::Relaxed),
            records_inserted: self.inner.records_inserted.load(Ordering::Relaxed),
            records_updated: self.inner.records_updated.load(Ordering::Relaxed),
            skipped_validation: self.inner.skipped_validation.load(Ordering::Relaxed),
            skipped_store: self.inner.skipped_store.load(Ordering::Relaxed),
        }
    }
}
