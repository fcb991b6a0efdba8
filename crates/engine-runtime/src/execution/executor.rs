use crate::{error::RuntimeError, execution::factory, handle::RunHandle};
use engine_config::{report::summary::RunSummary, settings::CrawlSettings};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Validates `settings`, wires a campground crawl and runs it to the end.
///
/// Tripping `cancel` stops the run at the next page boundary; the returned
/// summary then has outcome `Cancelled`.
pub async fn run(
    settings: CrawlSettings,
    cancel: CancellationToken,
) -> Result<RunSummary, RuntimeError> {
    settings.validate()?;
    info!(
        grid_size = settings.grid_size,
        per_page = settings.per_page,
        max_pages = settings.max_pages_per_cell,
        resume = settings.resume,
        checkpoint = %settings.checkpoint.backend,
        "Preparing crawl"
    );

    let engine = factory::create_engine(&settings, CancellationToken::new()).await?;
    let handle = RunHandle::start(engine);

    tokio::select! {
        _ = cancel.cancelled() => {
            warn!("Shutdown requested, stopping after current page");
            handle.request_cancel();
        }
        state = handle.finished() => {
            info!(%state, "Crawl task finished");
        }
    }

    handle.wait().await
}
