pub mod engine;
pub mod options;

pub use engine::CrawlEngine;
pub use options::CrawlOptions;
