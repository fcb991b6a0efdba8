use engine_config::settings::CrawlSettings;
use model::geo::BoundingRegion;
use std::time::Duration;

/// The subset of [`CrawlSettings`] the engine itself acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOptions {
    pub region: BoundingRegion,
    pub grid_size: usize,
    /// Safety bound against runaway pagination inside one cell.
    pub max_pages_per_cell: u32,
    pub page_delay: Duration,
    /// Continue from the stored checkpoint instead of starting over.
    pub resume: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_settings(&CrawlSettings::default())
    }
}

impl CrawlOptions {
    pub fn from_settings(settings: &CrawlSettings) -> Self {
        Self {
            region: settings.region,
            grid_size: settings.grid_size,
            max_pages_per_cell: settings.max_pages_per_cell,
            page_delay: settings.page_delay(),
            resume: settings.resume,
        }
    }
}
