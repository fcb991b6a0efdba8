pub mod adapter;
pub mod utils;

pub use adapter::PgAdapter;
