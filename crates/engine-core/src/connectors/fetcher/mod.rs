use crate::error::FetchError;
use async_trait::async_trait;
use model::{geo::BoundingRegion, records::RawItem};

pub mod http;

/// One page of raw results for a region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<RawItem>,
    /// Whether the source reports further pages after this one.
    pub has_more: bool,
}

impl Page {
    pub fn new(items: Vec<RawItem>, has_more: bool) -> Self {
        Self { items, has_more }
    }

    pub fn last(items: Vec<RawItem>) -> Self {
        Self::new(items, false)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fetches one page of a region. `page` is 0-based.
///
/// Implementations own their retry policy; an error returned here means the
/// page could not be obtained at all.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, region: &BoundingRegion, page: u32) -> Result<Page, FetchError>;
}
