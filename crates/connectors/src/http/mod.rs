pub mod client;
pub mod response;

pub use client::{ApiClientConfig, SearchApiClient};
pub use response::SearchPage;
