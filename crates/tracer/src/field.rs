//! Immutable gridded vector fields with bilinear sampling.

use flow_common::{BoundingBox, FlowError, FlowResult, GridAxes};

/// A regular 2D grid of velocity samples.
///
/// Component grids are row-major `(ny, nx)`: `u[j * nx + i]` is the
/// x-component at `(x[i], y[j])`. The field is read-only after
/// construction; tracing never mutates it.
#[derive(Debug, Clone)]
pub struct VectorField {
    axes: GridAxes,
    u: Vec<f32>,
    v: Vec<f32>,
}

impl VectorField {
    /// Create a field from 1-D coordinate axes and row-major component grids.
    pub fn new(x: Vec<f64>, y: Vec<f64>, u: Vec<f32>, v: Vec<f32>) -> FlowResult<Self> {
        let axes = GridAxes::new(x, y)?;
        let expected = axes.nx() * axes.ny();
        if u.len() != expected {
            return Err(FlowError::ShapeMismatch {
                expected,
                actual: u.len(),
            });
        }
        if v.len() != expected {
            return Err(FlowError::ShapeMismatch {
                expected,
                actual: v.len(),
            });
        }
        Ok(Self { axes, u, v })
    }

    /// Create a field from 2-D meshgrid coordinate arrays.
    ///
    /// `x_mesh` and `y_mesh` are row-major `(ny, nx)` like the component
    /// grids; the x axis is read from the first row and the y axis from
    /// the first column, matching how plotting scripts pass meshgrid
    /// output.
    pub fn from_meshgrid(
        x_mesh: &[f64],
        y_mesh: &[f64],
        nx: usize,
        ny: usize,
        u: Vec<f32>,
        v: Vec<f32>,
    ) -> FlowResult<Self> {
        if x_mesh.len() != nx * ny || y_mesh.len() != nx * ny {
            return Err(FlowError::ShapeMismatch {
                expected: nx * ny,
                actual: x_mesh.len().min(y_mesh.len()),
            });
        }
        let x: Vec<f64> = x_mesh[..nx].to_vec();
        let y: Vec<f64> = (0..ny).map(|j| y_mesh[j * nx]).collect();
        Self::new(x, y, u, v)
    }

    pub fn axes(&self) -> &GridAxes {
        &self.axes
    }

    pub fn nx(&self) -> usize {
        self.axes.nx()
    }

    pub fn ny(&self) -> usize {
        self.axes.ny()
    }

    pub fn dx(&self) -> f64 {
        self.axes.dx()
    }

    pub fn dy(&self) -> f64 {
        self.axes.dy()
    }

    /// Domain bounds spanned by the axes.
    pub fn bounds(&self) -> BoundingBox {
        self.axes.bbox()
    }

    /// Velocity components at grid indices `(i, j)`.
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> (f32, f32) {
        let idx = j * self.nx() + i;
        (self.u[idx], self.v[idx])
    }

    /// Containing grid cell of a continuous position, clamped to the grid.
    #[inline]
    pub fn cell_of(&self, x: f64, y: f64) -> (usize, usize) {
        let nx = self.nx();
        let ny = self.ny();
        let ti = (x - self.axes.x()[0]) / self.dx();
        let tj = (y - self.axes.y()[0]) / self.dy();
        let i = (ti.floor().max(0.0) as usize).min(nx - 1);
        let j = (tj.floor().max(0.0) as usize).min(ny - 1);
        (i, j)
    }

    /// Bilinearly interpolated velocity at a continuous position.
    ///
    /// Cell indices are clamped to `[0, n-2]` so sampling at or beyond the
    /// last row/column reads the final cell instead of going out of
    /// bounds; the fractional weight then reaches 1 at the far edge.
    pub fn interpolate(&self, x: f64, y: f64) -> (f32, f32) {
        let nx = self.nx();
        let ny = self.ny();

        let ti = (x - self.axes.x()[0]) / self.dx();
        let tj = (y - self.axes.y()[0]) / self.dy();

        let i = (ti.floor().max(0.0) as usize).min(nx - 2);
        let j = (tj.floor().max(0.0) as usize).min(ny - 2);

        let ai = (ti - i as f64) as f32;
        let aj = (tj - j as f64) as f32;

        let (u00, v00) = self.at(i, j);
        let (u10, v10) = self.at(i + 1, j);
        let (u01, v01) = self.at(i, j + 1);
        let (u11, v11) = self.at(i + 1, j + 1);

        let u = u00 * (1.0 - ai) * (1.0 - aj)
            + u10 * ai * (1.0 - aj)
            + u01 * (1.0 - ai) * aj
            + u11 * ai * aj;
        let v = v00 * (1.0 - ai) * (1.0 - aj)
            + v10 * ai * (1.0 - aj)
            + v01 * (1.0 - ai) * aj
            + v11 * ai * aj;

        (u, v)
    }
}
