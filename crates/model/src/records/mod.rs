pub mod campground;
pub mod raw;

use chrono::{DateTime, Utc};

pub use campground::Campground;
pub use raw::RawItem;

/// A validated entity that can be upserted by identity.
///
/// `identity` is the upstream API's canonical id and is the only key used for
/// deduplication; which grid cell produced the record plays no part in it.
pub trait DomainRecord: Clone + Send + Sync + 'static {
    fn identity(&self) -> &str;

    fn updated_at(&self) -> Option<DateTime<Utc>>;

    /// Stamps the record right before it is handed to a sink.
    fn touch(&mut self, at: DateTime<Utc>);
}
