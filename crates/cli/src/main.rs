use crate::{
    commands::{Commands, SettingsArgs},
    env::EnvManager,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use engine_config::{
    report::summary::RunOutcome,
    settings::{CrawlSettings, env::ENV_KEYS},
};
use engine_core::progress::ProgressService;
use engine_runtime::execution::{executor, factory};
use model::geo::partition;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "gridcrawl",
    version,
    about = "Resumable grid crawler for the campground search API"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let code = match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::GeneralError
        }
    };

    std::process::exit(code.as_i32());
}

async fn run(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Crawl {
            settings,
            fresh,
            grid_size,
            per_page,
            max_pages,
            delay_ms,
            rejected,
            json,
        } => {
            let mut crawl = load_settings(&settings)?;
            if fresh {
                crawl.resume = false;
            }
            if let Some(n) = grid_size {
                crawl.grid_size = n;
            }
            if let Some(n) = per_page {
                crawl.per_page = n;
            }
            if let Some(n) = max_pages {
                crawl.max_pages_per_cell = n;
            }
            if let Some(ms) = delay_ms {
                crawl.page_delay_ms = ms;
            }
            if rejected.is_some() {
                crawl.rejected_items_path = rejected;
            }

            let shutdown = ShutdownCoordinator::new(CancellationToken::new());
            shutdown.register_handlers();

            let summary = executor::run(crawl, shutdown.cancel_token()).await?;
            output::print_summary(&summary, json)?;

            if summary.outcome == RunOutcome::Cancelled || shutdown.is_shutdown_requested() {
                info!("Progress saved; rerun `gridcrawl crawl` to resume");
                return Ok(ExitCode::ShutdownRequested);
            }
        }
        Commands::Status { settings, json } => {
            let crawl = load_settings(&settings)?;
            let store = factory::create_state_store(&crawl.checkpoint)?;
            let location = store.describe();
            let status = ProgressService::new(store).status().await?;
            output::print_progress(&location, &status, json)?;
        }
        Commands::Reset { settings } => {
            let crawl = load_settings(&settings)?;
            let store = factory::create_state_store(&crawl.checkpoint)?;
            store.clear_checkpoint().await?;
            info!(store = %store.describe(), "Checkpoint cleared");
        }
        Commands::InitDb { settings } => {
            let crawl = load_settings(&settings)?;
            let sink = factory::create_sink(&crawl).await?;
            sink.ensure_schema().await?;
            info!(rows = sink.count().await?, "Database initialised");
        }
        Commands::Partition {
            settings,
            grid_size,
            json,
        } => {
            let mut crawl = load_settings(&settings)?;
            if let Some(n) = grid_size {
                crawl.grid_size = n;
            }
            let cells = partition(&crawl.region, crawl.grid_size)?;
            output::print_cells(&cells, json)?;
        }
    }

    Ok(ExitCode::Success)
}

/// Defaults, then the settings file, then the environment, then `--checkpoint`.
/// Command-specific flags are applied by the caller before validation.
fn load_settings(args: &SettingsArgs) -> Result<CrawlSettings, CliError> {
    let mut settings = match &args.settings {
        Some(path) => CrawlSettings::from_file(path)?,
        None => CrawlSettings::default(),
    };

    let env = EnvManager::load(args.env_file.as_deref())?;
    for key in ENV_KEYS {
        if let Some(value) = env.display_value(key) {
            debug!(key, value = %value, "Environment override");
        }
    }
    settings.apply_env(env.all())?;

    if let Some(path) = &args.checkpoint {
        settings.checkpoint.path = path.clone();
    }

    Ok(settings)
}
