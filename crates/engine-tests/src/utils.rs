use async_trait::async_trait;
use connectors::http::{ApiClientConfig, SearchApiClient};
use engine_core::{
    connectors::{
        fetcher::{Page, PageFetcher, http::HttpPageFetcher},
        sink::{UpsertOutcome, UpsertSink, memory::MemorySink},
    },
    error::{FetchError, SinkError},
    retry::RetryPolicy,
    state::memory_store::MemoryStateStore,
};
use engine_processing::{
    crawl::{CrawlEngine, CrawlOptions},
    normalize::CampgroundNormalizer,
};
use model::{
    geo::{BoundingRegion, CellId, GridCell, partition},
    records::{Campground, DomainRecord, RawItem},
};
use serde_json::{Value, json};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::Mutex,
    task::JoinHandle,
};

/// The 20°×20° square used by most scenarios.
pub fn square() -> BoundingRegion {
    BoundingRegion::new(-10.0, 10.0, -10.0, 10.0).unwrap()
}

pub fn options(grid_size: usize) -> CrawlOptions {
    CrawlOptions {
        region: square(),
        grid_size,
        max_pages_per_cell: 10,
        page_delay: Duration::ZERO,
        resume: true,
    }
}

pub fn campground_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Campground {id}"),
        "latitude": 1.5,
        "longitude": -2.5,
        "state": "CA",
        "rating": 4.0
    })
}

pub fn items(ids: &[&str]) -> Vec<RawItem> {
    ids.iter().map(|id| RawItem::Json(campground_json(id))).collect()
}

type Script = dyn Fn(CellId, u32) -> Result<Page, FetchError> + Send + Sync;

/// Page fetcher driven by a closure over `(cell, page)`.
///
/// The fetcher maps the requested region back to its grid cell, so scripts
/// are written in terms of cells. Every call is recorded.
pub struct ScriptedFetcher {
    cells: Vec<GridCell>,
    script: Box<Script>,
    calls: Mutex<Vec<(CellId, u32)>>,
}

impl ScriptedFetcher {
    pub fn new<F>(region: BoundingRegion, grid_size: usize, script: F) -> Arc<Self>
    where
        F: Fn(CellId, u32) -> Result<Page, FetchError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            cells: partition(&region, grid_size).unwrap(),
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub async fn calls(&self) -> Vec<(CellId, u32)> {
        self.calls.lock().await.clone()
    }

    pub async fn calls_for(&self, cell: CellId) -> Vec<u32> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|(c, _)| *c == cell)
            .map(|(_, page)| *page)
            .collect()
    }

    fn cell_for(&self, region: &BoundingRegion) -> CellId {
        self.cells
            .iter()
            .find(|cell| cell.region == *region)
            .map(|cell| cell.id)
            .expect("fetch for a region outside the grid")
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, region: &BoundingRegion, page: u32) -> Result<Page, FetchError> {
        let cell = self.cell_for(region);
        self.calls.lock().await.push((cell, page));
        (self.script)(cell, page)
    }
}

/// Wraps a [`MemorySink`] and keeps the `updated_at` of every upsert call.
pub struct RecordingSink<R: DomainRecord> {
    pub inner: MemorySink<R>,
    pub seen: Mutex<Vec<(String, Option<chrono::DateTime<chrono::Utc>>)>>,
}

impl<R: DomainRecord> RecordingSink<R> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemorySink::new(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl<R: DomainRecord> UpsertSink<R> for RecordingSink<R> {
    async fn upsert(&self, record: &R) -> Result<UpsertOutcome, SinkError> {
        self.seen
            .lock()
            .await
            .push((record.identity().to_string(), record.updated_at()));
        self.inner.upsert(record).await
    }
}

/// Engine over in-memory collaborators.
pub fn memory_engine(
    options: CrawlOptions,
    fetcher: Arc<ScriptedFetcher>,
    sink: Arc<dyn UpsertSink<Campground>>,
    state: Arc<MemoryStateStore>,
) -> CrawlEngine<Campground> {
    CrawlEngine::new(
        options,
        fetcher,
        Arc::new(CampgroundNormalizer::new()),
        sink,
        state,
    )
}

/// Local HTTP endpoint that answers every request with `200` and a fixed
/// JSON body.
pub struct JsonServer {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl JsonServer {
    pub async fn start(body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = requests.clone();
        let task = tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let response = response.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url,
            requests,
            task,
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Real HTTP fetcher pointed at this server, three attempts per page.
    pub fn fetcher(&self, per_page: u32) -> Arc<HttpPageFetcher> {
        let client = SearchApiClient::new(ApiClientConfig {
            base_url: self.base_url.clone(),
            search_path: "/api/v2/campgrounds/".to_string(),
            timeout: Duration::from_secs(5),
            ..ApiClientConfig::default()
        })
        .unwrap();
        Arc::new(HttpPageFetcher::new(client, RetryPolicy::immediate(3), per_page))
    }
}

impl Drop for JsonServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
