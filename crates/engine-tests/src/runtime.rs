#[cfg(test)]
mod tests {
    use crate::utils::{ScriptedFetcher, items, memory_engine, options, square};
    use async_trait::async_trait;
    use engine_config::report::summary::RunOutcome;
    use engine_core::{
        connectors::{
            fetcher::{Page, PageFetcher},
            sink::memory::MemorySink,
        },
        error::FetchError,
        state::{StateStore, memory_store::MemoryStateStore},
    };
    use engine_processing::{
        crawl::CrawlEngine, error::CrawlError, normalize::CampgroundNormalizer,
    };
    use engine_runtime::{
        error::RuntimeError,
        handle::{RunHandle, RunState},
    };
    use model::{
        geo::BoundingRegion,
        records::Campground,
    };
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU32, Ordering},
        },
        time::Duration,
    };

    /// Never runs out of pages; each fetch takes `delay`.
    struct EndlessFetcher {
        delay: Duration,
        served: AtomicU32,
    }

    #[async_trait]
    impl PageFetcher for EndlessFetcher {
        async fn fetch(&self, _region: &BoundingRegion, page: u32) -> Result<Page, FetchError> {
            tokio::time::sleep(self.delay).await;
            let n = self.served.fetch_add(1, Ordering::SeqCst);
            let id = format!("endless-{page}-{n}");
            Ok(Page::new(items(&[&id]), true))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancel_request_stops_run_and_keeps_progress() {
        let mut opts = options(1);
        opts.max_pages_per_cell = 10_000;
        let state = Arc::new(MemoryStateStore::new());
        let engine: CrawlEngine<Campground> = CrawlEngine::new(
            opts,
            Arc::new(EndlessFetcher {
                delay: Duration::from_millis(10),
                served: AtomicU32::new(0),
            }),
            Arc::new(CampgroundNormalizer::new()),
            Arc::new(MemorySink::<Campground>::new()),
            state.clone(),
        );

        let handle = RunHandle::start(engine);
        assert_eq!(handle.status().state, RunState::Running);

        while handle.status().metrics.pages_fetched < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        handle.request_cancel();
        let after_request = handle.status().state;
        assert!(
            matches!(after_request, RunState::Cancelling | RunState::Cancelled),
            "unexpected state {after_request}"
        );

        assert_eq!(handle.finished().await, RunState::Cancelled);
        let status = handle.status();
        assert!(status.metrics.records_upserted() >= 3);

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(summary.cells_completed, 0);

        let cp = state.load_checkpoint().await.unwrap().unwrap();
        assert!(cp.current_cell.is_some());
        assert_eq!(cp.total_records_processed, summary.records_processed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn completed_run_ignores_late_cancel() {
        let fetcher = ScriptedFetcher::new(square(), 2, |cell, _page| {
            let id = cell.to_string();
            Ok(Page::last(items(&[&id])))
        });
        let engine = memory_engine(
            options(2),
            fetcher,
            Arc::new(MemorySink::<Campground>::new()),
            Arc::new(MemoryStateStore::new()),
        );
        let cancel = engine.cancel_token();

        let handle = RunHandle::start(engine);
        assert_eq!(handle.finished().await, RunState::Completed);

        handle.request_cancel();
        assert_eq!(handle.status().state, RunState::Completed);
        assert!(!cancel.is_cancelled());

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.records_processed, 4);
        assert_eq!(summary.records_upserted, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fetch_failure_marks_run_failed() {
        let fetcher = ScriptedFetcher::new(square(), 1, |_cell, _page| {
            Err(FetchError::Other("connection reset".to_string()))
        });
        let engine = memory_engine(
            options(1),
            fetcher,
            Arc::new(MemorySink::<Campground>::new()),
            Arc::new(MemoryStateStore::new()),
        );

        let handle = RunHandle::start(engine);
        assert_eq!(handle.finished().await, RunState::Failed);

        match handle.wait().await {
            Err(RuntimeError::Crawl(CrawlError::Fetch { page, .. })) => assert_eq!(page, 0),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
