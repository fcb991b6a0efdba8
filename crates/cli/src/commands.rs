use clap::{Args, Subcommand};

/// Where settings come from, shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[arg(long, help = "JSON settings file; missing keys keep their defaults")]
    pub settings: Option<String>,

    #[arg(
        long,
        help = "KEY=VALUE env file merged over the process environment (default: .env if present)"
    )]
    pub env_file: Option<String>,

    #[arg(long, help = "Checkpoint location, overrides settings and environment")]
    pub checkpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the search API grid into the database
    Crawl {
        #[command(flatten)]
        settings: SettingsArgs,

        #[arg(long, help = "Ignore any stored checkpoint and start from the first cell")]
        fresh: bool,

        #[arg(long, help = "Number of rows and columns in the crawl grid")]
        grid_size: Option<usize>,

        #[arg(long, help = "Items requested per page")]
        per_page: Option<u32>,

        #[arg(long, help = "Maximum pages fetched per grid cell")]
        max_pages: Option<u32>,

        #[arg(long, help = "Minimum delay between page requests, in milliseconds")]
        delay_ms: Option<u64>,

        #[arg(long, help = "Append items that fail validation to this JSONL file")]
        rejected: Option<String>,

        #[arg(long, help = "Print the run summary as JSON")]
        json: bool,
    },
    /// Show progress recorded in the checkpoint
    Status {
        #[command(flatten)]
        settings: SettingsArgs,

        #[arg(
            long,
            help = "If set, prints the progress information as JSON instead of a table"
        )]
        json: bool,
    },
    /// Delete the stored checkpoint so the next crawl starts over
    Reset {
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Create the campgrounds table if it does not exist
    InitDb {
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Print the grid cells the crawl would visit, in order
    Partition {
        #[command(flatten)]
        settings: SettingsArgs,

        #[arg(long, help = "Number of rows and columns in the crawl grid")]
        grid_size: Option<usize>,

        #[arg(long, help = "Print the cells as JSON")]
        json: bool,
    },
}
