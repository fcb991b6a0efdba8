pub mod grid;
pub mod region;

pub use grid::{CellId, GridCell, MAX_GRID_SIZE, partition};
pub use region::BoundingRegion;
