use crate::{errors::GeoError, geo::region::BoundingRegion};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a cell inside an N×N partition.
///
/// Serialized as a `[row, col]` pair so checkpoints stay readable.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct CellId {
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub fn new(row: usize, col: usize) -> Self {
        CellId { row, col }
    }

    /// Position of this cell in row-major visitation order.
    pub fn ordinal(&self, grid_size: usize) -> usize {
        self.row * grid_size + self.col
    }
}

impl From<(usize, usize)> for CellId {
    fn from((row, col): (usize, usize)) -> Self {
        CellId { row, col }
    }
}

impl From<CellId> for (usize, usize) {
    fn from(id: CellId) -> Self {
        (id.row, id.col)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub id: CellId,
    pub region: BoundingRegion,
}

/// Largest accepted grid side; a million cells is far beyond any useful crawl.
pub const MAX_GRID_SIZE: usize = 1000;

/// Splits `region` into `n × n` cells in row-major order.
///
/// Rows grow from south to north and columns from west to east. Neighbouring
/// cells share the exact same edge value and the outermost edges are copied
/// from `region`, so the cells tile the region with no gaps and no overhang.
pub fn partition(region: &BoundingRegion, n: usize) -> Result<Vec<GridCell>, GeoError> {
    if n == 0 {
        return Err(GeoError::ZeroGridSize);
    }
    if n > MAX_GRID_SIZE {
        return Err(GeoError::GridTooLarge {
            n,
            max: MAX_GRID_SIZE,
        });
    }
    region.validate()?;

    let lon_edges = edges(region.west, region.east, n);
    let lat_edges = edges(region.south, region.north, n);

    let mut cells = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            cells.push(GridCell {
                id: CellId::new(row, col),
                region: BoundingRegion {
                    west: lon_edges[col],
                    east: lon_edges[col + 1],
                    south: lat_edges[row],
                    north: lat_edges[row + 1],
                },
            });
        }
    }

    Ok(cells)
}

fn edges(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / n as f64;
    (0..=n)
        .map(|i| match i {
            0 => start,
            i if i == n => end,
            i => start + i as f64 * step,
        })
        .collect()
}
