use crate::error::RuntimeError;
use connectors::{
    http::{ApiClientConfig, SearchApiClient},
    sql::postgres::PgAdapter,
};
use engine_config::settings::{CheckpointBackend, CheckpointSettings, CrawlSettings};
use engine_core::{
    connectors::{
        fetcher::{PageFetcher, http::HttpPageFetcher},
        sink::{UpsertSink, postgres::PostgresSink},
    },
    retry::RetryPolicy,
    state::{StateStore, file_store::FileStateStore, sled_store::SledStateStore},
};
use engine_processing::{
    crawl::{CrawlEngine, CrawlOptions},
    normalize::CampgroundNormalizer,
    rejected::RejectedItemWriter,
};
use model::records::Campground;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn create_state_store(settings: &CheckpointSettings) -> Result<Arc<dyn StateStore>, RuntimeError> {
    let store: Arc<dyn StateStore> = match settings.backend {
        CheckpointBackend::File => Arc::new(FileStateStore::new(&settings.path)),
        CheckpointBackend::Sled => Arc::new(SledStateStore::open(&settings.path)?),
    };
    Ok(store)
}

pub fn create_fetcher(settings: &CrawlSettings) -> Result<Arc<dyn PageFetcher>, RuntimeError> {
    let client = SearchApiClient::new(ApiClientConfig {
        base_url: settings.api.base_url.clone(),
        search_path: settings.api.search_path.clone(),
        timeout: settings.api.timeout(),
        ..ApiClientConfig::default()
    })?;
    let retry = RetryPolicy::for_http(settings.api.max_retries, settings.api.retry_delay());

    info!(url = client.search_url(), per_page = settings.per_page, "Search API client ready");
    Ok(Arc::new(HttpPageFetcher::new(client, retry, settings.per_page)))
}

pub async fn create_sink(settings: &CrawlSettings) -> Result<Arc<PostgresSink>, RuntimeError> {
    let adapter = PgAdapter::connect(&settings.database_url).await?;
    Ok(Arc::new(PostgresSink::new(adapter)))
}

/// Wires a campground crawl from settings: HTTP fetcher, Postgres sink with
/// its table ensured, and the configured checkpoint backend.
pub async fn create_engine(
    settings: &CrawlSettings,
    cancel: CancellationToken,
) -> Result<CrawlEngine<Campground>, RuntimeError> {
    let state = create_state_store(&settings.checkpoint)?;
    let fetcher = create_fetcher(settings)?;
    let sink = create_sink(settings).await?;
    sink.ensure_schema().await?;

    let sink: Arc<dyn UpsertSink<Campground>> = sink;
    let mut engine = CrawlEngine::new(
        CrawlOptions::from_settings(settings),
        fetcher,
        Arc::new(CampgroundNormalizer::new()),
        sink,
        state,
    )
    .with_cancel_token(cancel);

    if let Some(path) = &settings.rejected_items_path {
        info!(path = %path, "Rejected items will be logged");
        engine = engine.with_rejected_writer(Arc::new(RejectedItemWriter::new(path)));
    }

    Ok(engine)
}
