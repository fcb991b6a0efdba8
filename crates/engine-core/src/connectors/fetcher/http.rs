use crate::{
    connectors::fetcher::{Page, PageFetcher},
    error::FetchError,
    retry::{RetryDisposition, RetryError, RetryPolicy},
};
use async_trait::async_trait;
use connectors::{error::ApiError, http::SearchApiClient};
use model::{geo::BoundingRegion, records::RawItem};
use tracing::debug;

/// [`PageFetcher`] over the campground search API.
pub struct HttpPageFetcher {
    client: SearchApiClient,
    retry: RetryPolicy,
    per_page: u32,
}

impl HttpPageFetcher {
    pub fn new(client: SearchApiClient, retry: RetryPolicy, per_page: u32) -> Self {
        Self {
            client,
            retry,
            per_page: per_page.max(1),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, region: &BoundingRegion, page: u32) -> Result<Page, FetchError> {
        let api_page = page + 1;

        let result = self
            .retry
            .run(
                || self.client.search(region, api_page, self.per_page),
                classify_api_error,
            )
            .await;

        let search = match result {
            Ok(search) => search,
            Err(RetryError::Fatal(e)) => return Err(FetchError::Api(e)),
            Err(RetryError::AttemptsExceeded { attempts, last }) => {
                return Err(FetchError::RetriesExhausted {
                    attempts,
                    last_error: last.to_string(),
                });
            }
        };

        let has_more = has_more(search.items.len(), self.per_page, api_page, search.total_pages);
        debug!(
            page,
            items = search.items.len(),
            total_pages = ?search.total_pages,
            has_more,
            "Fetched search page"
        );

        Ok(Page::new(
            search.items.into_iter().map(RawItem::Json).collect(),
            has_more,
        ))
    }
}

/// A short page always ends the cell; a full page ends it only when the API
/// says this was the last page.
fn has_more(items: usize, per_page: u32, api_page: u32, total_pages: Option<u32>) -> bool {
    if items < per_page as usize {
        return false;
    }
    match total_pages {
        Some(total) => api_page < total,
        None => true,
    }
}

/// Server errors, throttling and transport failures are worth another try;
/// client errors, undecodable bodies and unknown layouts are not.
pub fn classify_api_error(err: &ApiError) -> RetryDisposition {
    match err {
        ApiError::Status { status, .. } if *status == 429 || *status >= 500 => {
            RetryDisposition::Retry
        }
        ApiError::Status { .. } => RetryDisposition::Stop,
        ApiError::Request(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
            RetryDisposition::Retry
        }
        ApiError::Request(e) if e.is_decode() || e.is_builder() => RetryDisposition::Stop,
        ApiError::Request(_) => RetryDisposition::Retry,
        ApiError::Decode(_) | ApiError::UnexpectedLayout { .. } | ApiError::Config(_) => {
            RetryDisposition::Stop
        }
    }
}
