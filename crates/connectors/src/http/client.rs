use crate::{
    error::ApiError,
    http::response::{SearchPage, parse_search_response},
};
use model::geo::BoundingRegion;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, ORIGIN, PRAGMA, REFERER,
};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://thedyrt.com";
pub const DEFAULT_SEARCH_PATH: &str = "/api/v2/campgrounds/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub search_path: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Thin client over the campground search endpoint.
///
/// One call fetches one page; retrying is left to the caller.
#[derive(Clone)]
pub struct SearchApiClient {
    http: reqwest::Client,
    search_url: String,
}

impl SearchApiClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let base = config.base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(default_headers(&base)?)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            search_url: format!("{base}{}", config.search_path),
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Fetches one page of results. `page` is 1-based, as the API expects.
    pub async fn search(
        &self,
        bounds: &BoundingRegion,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, ApiError> {
        let bounds_param = bounds_param(bounds);
        let page_param = page.to_string();
        let per_page_param = per_page.to_string();
        debug!(bounds = %bounds_param, page, per_page, "Requesting search page");

        let response = self
            .http
            .get(&self.search_url)
            .query(&[
                ("bounds", bounds_param.as_str()),
                ("sort", "recommended"),
                ("page", page_param.as_str()),
                ("per_page", per_page_param.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        parse_search_response(body, page)
    }
}

/// Formats bounds the way the search endpoint wants them: `south,west,north,east`.
pub fn bounds_param(bounds: &BoundingRegion) -> String {
    format!(
        "{},{},{},{}",
        bounds.south, bounds.west, bounds.north, bounds.east
    )
}

fn default_headers(base: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    let origin = HeaderValue::from_str(base).map_err(|e| ApiError::Config(e.to_string()))?;
    let referer = HeaderValue::from_str(&format!("{base}/campgrounds"))
        .map_err(|e| ApiError::Config(e.to_string()))?;
    headers.insert(ORIGIN, origin);
    headers.insert(REFERER, referer);

    Ok(headers)
}
