//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, FlowResult};

/// A geographic bounding box in degrees.
///
/// Extent arrays follow the plotting convention
/// `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build from an extent array `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn from_extent(extent: [f64; 4]) -> FlowResult<Self> {
        let [min_x, min_y, max_x, max_y] = extent;
        if min_x >= max_x || min_y >= max_y {
            return Err(FlowError::InvalidExtent(format!(
                "min must be less than max: [{}, {}, {}, {}]",
                min_x, min_y, max_x, max_y
            )));
        }
        Ok(Self::new(min_x, min_y, max_x, max_y))
    }

    /// Extent array `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn to_extent(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Check if a point lies strictly inside this bbox (open interval).
    ///
    /// Used by the tracer domain test, where a point exactly on the
    /// boundary terminates the march.
    pub fn contains_point_open(&self, x: f64, y: f64) -> bool {
        x > self.min_x && x < self.max_x && y > self.min_y && y < self.max_y
    }
}
