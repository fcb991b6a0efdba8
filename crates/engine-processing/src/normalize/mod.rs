use model::{errors::ValidationError, records::RawItem};

pub mod campground;

pub use campground::CampgroundNormalizer;

/// Turns a raw page item into a typed record, or explains why it cannot.
///
/// This is the only place that interprets the shape of a [`RawItem`].
pub trait RecordNormalizer<R>: Send + Sync {
    fn normalize(&self, raw: &RawItem) -> Result<R, ValidationError>;
}
