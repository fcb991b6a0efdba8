use crate::errors::GeoError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangular geographic window in degrees.
///
/// Construct through [`BoundingRegion::new`] to have `west < east` and
/// `south < north` enforced. Values are never mutated after construction.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    pub west: f64,
    pub east: f64,
    pub north: f64,
    pub south: f64,
}

impl BoundingRegion {
    /// Continental United States, the default crawl area.
    pub const US: BoundingRegion = BoundingRegion {
        west: -125.0,
        east: -66.0,
        north: 49.0,
        south: 24.0,
    };

    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Result<Self, GeoError> {
        let region = BoundingRegion {
            west,
            east,
            north,
            south,
        };
        region.validate()?;
        Ok(region)
    }

    /// Checks the ordering invariants. Regions coming from deserialization
    /// bypass [`BoundingRegion::new`] and must be validated explicitly.
    pub fn validate(&self) -> Result<(), GeoError> {
        for (name, value) in [
            ("west", self.west),
            ("east", self.east),
            ("north", self.north),
            ("south", self.south),
        ] {
            if !value.is_finite() {
                return Err(GeoError::NonFinite { name });
            }
        }

        if self.west >= self.east {
            return Err(GeoError::InvertedLongitude {
                west: self.west,
                east: self.east,
            });
        }

        if self.south >= self.north {
            return Err(GeoError::InvertedLatitude {
                south: self.south,
                north: self.north,
            });
        }

        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Planar area in square degrees.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Edges are inclusive, so a point on a shared border belongs to both neighbours.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        longitude >= self.west
            && longitude <= self.east
            && latitude >= self.south
            && latitude <= self.north
    }
}

impl fmt::Display for BoundingRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[W {:.4}, S {:.4}, E {:.4}, N {:.4}]",
            self.west, self.south, self.east, self.north
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_longitude() {
        let err = BoundingRegion::new(10.0, -10.0, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, GeoError::InvertedLongitude { .. }));
    }

    #[test]
    fn rejects_degenerate_latitude() {
        let err = BoundingRegion::new(-1.0, 1.0, 5.0, 5.0).unwrap_err();
        assert!(matches!(err, GeoError::InvertedLatitude { .. }));
    }

    #[test]
    fn rejects_nan() {
        let err = BoundingRegion::new(f64::NAN, 1.0, 0.0, 1.0).unwrap_err();
        assert_eq!(err, GeoError::NonFinite { name: "west" });
    }

    #[test]
    fn us_bounds_are_valid() {
        assert!(BoundingRegion::US.validate().is_ok());
        assert_eq!(BoundingRegion::US.width(), 59.0);
        assert_eq!(BoundingRegion::US.height(), 25.0);
    }

    #[test]
    fn contains_is_edge_inclusive() {
        let region = BoundingRegion::new(-10.0, 10.0, -10.0, 10.0).unwrap();
        assert!(region.contains(10.0, -10.0));
        assert!(region.contains(0.0, 0.0));
        assert!(!region.contains(10.5, 0.0));
    }
}
