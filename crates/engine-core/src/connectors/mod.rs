pub mod fetcher;
pub mod sink;
