//! Coordinate axes for regular lat/lon grids.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{FlowError, FlowResult};

/// 1-D coordinate axes of a uniform 2D grid.
///
/// `x` runs west to east (longitude), `y` south to north (latitude).
/// Both axes must be strictly increasing with at least two points;
/// spacing is assumed uniform along each axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridAxes {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl GridAxes {
    /// Create axes from 1-D coordinate arrays, validating monotonicity.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> FlowResult<Self> {
        validate_axis("x", &x)?;
        validate_axis("y", &y)?;
        Ok(Self { x, y })
    }

    /// Number of points along the x axis.
    pub fn nx(&self) -> usize {
        self.x.len()
    }

    /// Number of points along the y axis.
    pub fn ny(&self) -> usize {
        self.y.len()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Grid spacing along x, `(last - first) / (n - 1)`.
    pub fn dx(&self) -> f64 {
        (self.x[self.x.len() - 1] - self.x[0]) / (self.x.len() - 1) as f64
    }

    /// Grid spacing along y.
    pub fn dy(&self) -> f64 {
        (self.y[self.y.len() - 1] - self.y[0]) / (self.y.len() - 1) as f64
    }

    /// Bounding box spanned by the axes.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.x[0],
            self.y[0],
            self.x[self.x.len() - 1],
            self.y[self.y.len() - 1],
        )
    }

    /// Index ranges of the grid cells covering a region of interest.
    ///
    /// Returns `(x_range, y_range)` such that slicing both axes (and the
    /// matching rows/columns of a data grid) yields the subset covering
    /// the bbox. Ranges are clipped to the grid and never empty.
    pub fn subset(&self, bbox: &BoundingBox) -> FlowResult<(Range<usize>, Range<usize>)> {
        let own = self.bbox();
        if !own.intersects(bbox) {
            return Err(FlowError::InvalidExtent(format!(
                "requested region [{}, {}, {}, {}] does not intersect grid extent",
                bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
            )));
        }

        let x_range = axis_range(&self.x, self.dx(), bbox.min_x, bbox.max_x);
        let y_range = axis_range(&self.y, self.dy(), bbox.min_y, bbox.max_y);
        Ok((x_range, y_range))
    }
}

fn validate_axis(name: &str, axis: &[f64]) -> FlowResult<()> {
    if axis.len() < 2 {
        return Err(FlowError::DegenerateGrid(format!(
            "axis '{}' needs at least 2 points, got {}",
            name,
            axis.len()
        )));
    }
    if axis.windows(2).any(|w| w[1] <= w[0]) {
        return Err(FlowError::DegenerateGrid(format!(
            "axis '{}' must be strictly increasing",
            name
        )));
    }
    Ok(())
}

/// Index range along one axis covering `[lo, hi]`.
///
/// Floor for the lower bound, ceil for the upper, so every grid point
/// intersecting the interval is captured.
fn axis_range(axis: &[f64], step: f64, lo: f64, hi: f64) -> Range<usize> {
    let n = axis.len();
    let first = axis[0];

    let start = ((lo - first) / step).floor().max(0.0) as usize;
    let end = ((hi - first) / step).ceil() as usize + 1;

    let start = start.min(n - 1);
    let end = end.min(n).max(start + 1);
    start..end
}
