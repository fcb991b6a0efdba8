#[cfg(test)]
mod tests {
    use crate::utils::{
        JsonServer, RecordingSink, ScriptedFetcher, campground_json, items, memory_engine,
        options, square,
    };
    use connectors::error::ApiError;
    use engine_config::report::summary::RunOutcome;
    use engine_core::{
        connectors::{
            fetcher::Page,
            sink::{UpsertSink, memory::MemorySink},
        },
        error::FetchError,
        state::{
            StateStore, file_store::FileStateStore, memory_store::MemoryStateStore,
            models::Checkpoint,
        },
    };
    use engine_processing::{crawl::CrawlEngine, error::CrawlError, normalize::CampgroundNormalizer};
    use model::{
        geo::CellId,
        records::{Campground, RawItem},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    fn cell_ids(cell: CellId) -> [String; 2] {
        [format!("{cell}-a"), format!("{cell}-b")]
    }

    /// Two distinct items per cell on page 0, nothing more.
    fn two_per_cell() -> Arc<ScriptedFetcher> {
        ScriptedFetcher::new(square(), 2, |cell, _page| {
            let [a, b] = cell_ids(cell);
            Ok(Page::last(items(&[&a, &b])))
        })
    }

    #[traced_test]
    #[tokio::test]
    async fn two_by_two_grid_end_to_end() {
        let fetcher = two_per_cell();
        let sink = Arc::new(MemorySink::<Campground>::new());
        let state = Arc::new(MemoryStateStore::new());

        let summary = memory_engine(options(2), fetcher.clone(), sink.clone(), state.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.records_processed, 8);
        assert_eq!(summary.cells_completed, 4);
        assert_eq!(summary.cells_visited, 4);
        assert_eq!(summary.inserted, 8);
        assert_eq!(sink.len().await, 8);

        let cp = state.load_checkpoint().await.unwrap().unwrap();
        assert_eq!(cp.grid_size, 2);
        assert_eq!(cp.total_records_processed, 8);
        assert_eq!(cp.completed_cells.len(), 4);
        assert_eq!(cp.current_cell, None);

        // Partition order is the visitation order.
        let visited: Vec<CellId> = fetcher.calls().await.into_iter().map(|(c, _)| c).collect();
        assert_eq!(
            visited,
            vec![
                CellId::new(0, 0),
                CellId::new(0, 1),
                CellId::new(1, 0),
                CellId::new(1, 1)
            ]
        );
        assert!(logs_contain("Crawl completed"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn checkpoint_is_saved_after_every_page_and_cell() {
        // Cell (0,0) has three pages; the other cells are empty.
        let fetcher = ScriptedFetcher::new(square(), 2, |cell, page| {
            if cell == CellId::new(0, 0) {
                let id = format!("p{page}");
                Ok(Page::new(items(&[&id]), page < 2))
            } else {
                Ok(Page::default())
            }
        });
        let state = Arc::new(MemoryStateStore::new());

        memory_engine(
            options(2),
            fetcher,
            Arc::new(MemorySink::new()),
            state.clone(),
        )
        .run()
        .await
        .unwrap();

        let history = state.history().await;
        // Pages 0 and 1 of (0,0), then four cell completions.
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].current_cell, Some(CellId::new(0, 0)));
        assert_eq!(history[0].current_page, 0);
        assert_eq!(history[1].current_page, 1);
        assert_eq!(history[1].total_records_processed, 2);
        assert!(history[2].is_completed(&CellId::new(0, 0)));
        assert_eq!(history[2].total_records_processed, 3);
        assert_eq!(history[5].completed_cells.len(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn resumes_at_recorded_page_and_skips_completed_cells() {
        let mut stored = Checkpoint::empty(2);
        stored.completed_cells.insert(CellId::new(0, 0));
        stored.current_cell = Some(CellId::new(0, 1));
        stored.current_page = 3;
        stored.total_records_processed = 40;
        let state = Arc::new(MemoryStateStore::with_checkpoint(stored));

        let fetcher = ScriptedFetcher::new(square(), 2, |cell, page| {
            let id = format!("{cell}-{page}");
            Ok(Page::new(items(&[&id]), page < 4))
        });

        let summary = memory_engine(
            options(2),
            fetcher.clone(),
            Arc::new(MemorySink::new()),
            state.clone(),
        )
        .run()
        .await
        .unwrap();

        assert!(fetcher.calls_for(CellId::new(0, 0)).await.is_empty());
        assert_eq!(fetcher.calls_for(CellId::new(0, 1)).await, vec![3, 4]);
        assert_eq!(fetcher.calls_for(CellId::new(1, 0)).await, vec![0, 1, 2, 3, 4]);
        assert_eq!(summary.cells_visited, 3);
        assert_eq!(summary.cells_completed, 4);
        assert_eq!(summary.records_processed, 40 + 2 + 5 + 5);
    }

    #[traced_test]
    #[tokio::test]
    async fn grid_size_change_forces_fresh_start() {
        let mut stored = Checkpoint::empty(4);
        for col in 0..4 {
            stored.completed_cells.insert(CellId::new(0, col));
        }
        stored.total_records_processed = 99;
        let state = Arc::new(MemoryStateStore::with_checkpoint(stored));

        let summary = memory_engine(
            options(2),
            two_per_cell(),
            Arc::new(MemorySink::new()),
            state.clone(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(summary.grid_size, 2);
        assert_eq!(summary.cells_visited, 4);
        assert_eq!(summary.records_processed, 8);
        assert!(logs_contain("grid size mismatch"));

        let cp = state.load_checkpoint().await.unwrap().unwrap();
        assert_eq!(cp.grid_size, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fresh_flag_ignores_stored_progress() {
        let mut stored = Checkpoint::empty(2);
        stored.completed_cells.insert(CellId::new(0, 0));
        let state = Arc::new(MemoryStateStore::with_checkpoint(stored));

        let mut opts = options(2);
        opts.resume = false;
        let fetcher = two_per_cell();
        let summary = memory_engine(opts, fetcher.clone(), Arc::new(MemorySink::new()), state)
            .run()
            .await
            .unwrap();

        assert_eq!(fetcher.calls_for(CellId::new(0, 0)).await, vec![0]);
        assert_eq!(summary.records_processed, 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn duplicate_across_cells_is_stored_once() {
        // (0,0) and (0,1) share a record on their common edge.
        let fetcher = ScriptedFetcher::new(square(), 2, |cell, _page| {
            let own = format!("{cell}-own");
            if cell.row == 0 {
                Ok(Page::last(items(&["edge-1", &own])))
            } else {
                Ok(Page::last(items(&[&own])))
            }
        });
        let sink = RecordingSink::<Campground>::new();

        let summary = memory_engine(
            options(2),
            fetcher,
            sink.clone(),
            Arc::new(MemoryStateStore::new()),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(sink.inner.len().await, 5);
        assert_eq!(summary.inserted, 5);
        assert_eq!(summary.updated, 1);

        let seen = sink.seen.lock().await.clone();
        let stamps: Vec<_> = seen
            .iter()
            .filter(|(id, _)| id == "edge-1")
            .map(|(_, at)| at.unwrap())
            .collect();
        assert_eq!(stamps.len(), 2);
        assert!(stamps[1] >= stamps[0]);

        let row = sink.inner.get("edge-1").await.unwrap();
        assert_eq!(row.updated_at, stamps[1]);
        assert!(row.updated_at >= row.created_at);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn rerunning_the_crawl_is_idempotent() {
        let sink = Arc::new(MemorySink::<Campground>::new());

        let mut opts = options(2);
        opts.resume = false;
        for _ in 0..2 {
            memory_engine(
                opts.clone(),
                two_per_cell(),
                sink.clone(),
                Arc::new(MemoryStateStore::new()),
            )
            .run()
            .await
            .unwrap();
        }
        let first = sink.get("0-0-a").await.unwrap();

        let summary = memory_engine(
            opts,
            two_per_cell(),
            sink.clone(),
            Arc::new(MemoryStateStore::new()),
        )
        .run()
        .await
        .unwrap();
        let again = sink.get("0-0-a").await.unwrap();

        assert_eq!(sink.len().await, 8);
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.updated, 8);

        let strip = |mut c: Campground| {
            c.updated_at = None;
            c
        };
        assert_eq!(strip(first.record), strip(again.record));
        assert_eq!(first.created_at, again.created_at);
    }

    #[traced_test]
    #[tokio::test]
    async fn bad_items_and_store_failures_are_skipped_and_counted() {
        let fetcher = ScriptedFetcher::new(square(), 1, |_cell, _page| {
            Ok(Page::last(vec![
                RawItem::Json(campground_json("good-1")),
                RawItem::Json(json!({"name": "no id", "latitude": 1, "longitude": 1})),
                RawItem::Json(campground_json("store-fails")),
                RawItem::Bytes(b"<html>blocked</html>".to_vec()),
                RawItem::Json(campground_json("good-2")),
            ]))
        });
        let sink = Arc::new(MemorySink::<Campground>::new());
        sink.fail_on("store-fails").await;

        let mut opts = options(1);
        opts.max_pages_per_cell = 1;
        let summary = memory_engine(opts, fetcher, sink.clone(), Arc::new(MemoryStateStore::new()))
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.skipped_validation, 2);
        assert_eq!(summary.skipped_store, 1);
        assert_eq!(summary.records_processed, 2);
        assert_eq!(sink.identities().await, vec!["good-1", "good-2"]);
        assert!(logs_contain("Skipping invalid item"));
        assert!(logs_contain("no id"));
        assert!(logs_contain("Failed to store record"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fetch_failure_halts_run_and_keeps_checkpoint() {
        let failing = ScriptedFetcher::new(square(), 2, |cell, page| {
            if cell == CellId::new(1, 0) && page == 1 {
                return Err(FetchError::RetriesExhausted {
                    attempts: 4,
                    last_error: "HTTP 503".to_string(),
                });
            }
            let id = format!("{cell}-{page}");
            Ok(Page::new(items(&[&id]), page < 2))
        });
        let state = Arc::new(MemoryStateStore::new());

        let err = memory_engine(
            options(2),
            failing,
            Arc::new(MemorySink::new()),
            state.clone(),
        )
        .run()
        .await
        .unwrap_err();

        match err {
            CrawlError::Fetch { cell, page, .. } => {
                assert_eq!(cell, CellId::new(1, 0));
                assert_eq!(page, 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        let cp = state.load_checkpoint().await.unwrap().unwrap();
        assert!(cp.is_completed(&CellId::new(0, 0)));
        assert!(cp.is_completed(&CellId::new(0, 1)));
        assert_eq!(cp.current_cell, Some(CellId::new(1, 0)));
        assert_eq!(cp.current_page, 0);
        assert_eq!(cp.total_records_processed, 7);

        // The next run picks up the interrupted cell without revisiting others.
        let healthy = ScriptedFetcher::new(square(), 2, |cell, page| {
            let id = format!("{cell}-{page}");
            Ok(Page::new(items(&[&id]), page < 2))
        });
        let summary = memory_engine(
            options(2),
            healthy.clone(),
            Arc::new(MemorySink::new()),
            state.clone(),
        )
        .run()
        .await
        .unwrap();

        assert!(healthy.calls_for(CellId::new(0, 0)).await.is_empty());
        assert_eq!(healthy.calls_for(CellId::new(1, 0)).await, vec![0, 1, 2]);
        assert_eq!(summary.cells_completed, 4);

        // 12 distinct records; page 0 of the interrupted cell is counted twice.
        assert_eq!(summary.records_processed, 13);
        let cp = state.load_checkpoint().await.unwrap().unwrap();
        assert_eq!(cp.total_records_processed, 13);
    }

    #[traced_test]
    #[tokio::test]
    async fn unrecognised_response_body_fails_run_and_leaves_cell_pending() {
        let blocked = JsonServer::start(r#"{"error":"temporarily blocked"}"#).await;
        let state = Arc::new(MemoryStateStore::new());

        let err = CrawlEngine::new(
            options(2),
            blocked.fetcher(50),
            Arc::new(CampgroundNormalizer::new()),
            Arc::new(MemorySink::<Campground>::new()),
            state.clone(),
        )
        .run()
        .await
        .unwrap_err();

        match err {
            CrawlError::Fetch {
                cell,
                page,
                source: FetchError::Api(ApiError::UnexpectedLayout { body, .. }),
            } => {
                assert_eq!(cell, CellId::new(0, 0));
                assert_eq!(page, 0);
                assert!(body.contains("temporarily blocked"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Not retried and nothing recorded for the cell.
        assert_eq!(blocked.requests(), 1);
        assert!(state.load_checkpoint().await.unwrap().is_none());
        assert!(logs_contain("Unexpected search response format"));

        // Once the endpoint answers properly the same cells are crawled.
        let healthy = JsonServer::start(
            &json!({"campgrounds": [campground_json("cg-1")], "meta": {"total_pages": 1}})
                .to_string(),
        )
        .await;
        let sink = Arc::new(MemorySink::<Campground>::new());
        let summary = CrawlEngine::new(
            options(2),
            healthy.fetcher(50),
            Arc::new(CampgroundNormalizer::new()),
            sink.clone(),
            state.clone(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.cells_completed, 4);
        assert_eq!(healthy.requests(), 4);
        assert_eq!(sink.len().await, 1);
    }

    #[tokio::test]
    async fn known_layout_with_no_items_completes_the_cell() {
        let empty = JsonServer::start(r#"{"results":{"campgrounds":[]},"meta":{"total_pages":0}}"#).await;
        let state = Arc::new(MemoryStateStore::new());

        let summary = CrawlEngine::new(
            options(2),
            empty.fetcher(50),
            Arc::new(CampgroundNormalizer::new()),
            Arc::new(MemorySink::<Campground>::new()),
            state.clone(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(summary.cells_completed, 4);
        assert_eq!(summary.records_processed, 0);
        assert_eq!(empty.requests(), 4);
        let cp = state.load_checkpoint().await.unwrap().unwrap();
        assert_eq!(cp.completed_cells.len(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancellation_stops_at_page_boundary() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let fetcher = ScriptedFetcher::new(square(), 2, move |cell, page| {
            if cell == CellId::new(0, 1) && page == 1 {
                trigger.cancel();
            }
            let id = format!("{cell}-{page}");
            Ok(Page::new(items(&[&id]), page < 3))
        });
        let state = Arc::new(MemoryStateStore::new());
        let sink = Arc::new(MemorySink::<Campground>::new());

        let summary = memory_engine(options(2), fetcher.clone(), sink.clone(), state.clone())
            .with_cancel_token(cancel)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        // The page in flight when cancel fired is applied and checkpointed.
        assert_eq!(fetcher.calls_for(CellId::new(0, 1)).await, vec![0, 1]);
        assert!(sink.get("0-1-1").await.is_some());
        assert!(fetcher.calls_for(CellId::new(1, 0)).await.is_empty());

        let cp = state.load_checkpoint().await.unwrap().unwrap();
        assert_eq!(cp.current_cell, Some(CellId::new(0, 1)));
        assert_eq!(cp.current_page, 1);
        assert_eq!(cp.completed_cells.len(), 1);
        assert_eq!(cp.total_records_processed, 4 + 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn file_checkpoint_round_trips_through_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper_checkpoint.json");
        let store: Arc<dyn StateStore> = Arc::new(FileStateStore::new(&path));
        let sink: Arc<dyn UpsertSink<Campground>> = Arc::new(MemorySink::<Campground>::new());

        CrawlEngine::new(
            options(2),
            two_per_cell(),
            Arc::new(CampgroundNormalizer::new()),
            sink,
            store.clone(),
        )
        .run()
        .await
        .unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            doc,
            json!({
                "gridSize": 2,
                "completedCells": [[0, 0], [0, 1], [1, 0], [1, 1]],
                "currentCell": null,
                "currentPage": 0,
                "totalRecordsProcessed": 8
            })
        );
        assert_eq!(
            store.load_checkpoint().await.unwrap().unwrap().total_records_processed,
            8
        );
    }
}
