pub mod crawl;
pub mod error;
pub mod normalize;
pub mod rejected;
pub mod throttle;
