//! Occupancy tracking for streamline seeding.

use crate::field::VectorField;

/// Boolean grid marking cells already claimed by traced streamlines.
///
/// Marking is monotonic: cells are only ever set, never cleared. The
/// boundary rows/columns and zero-velocity cells start occupied, so
/// streamlines are never seeded there.
#[derive(Debug, Clone)]
pub struct OccupancyMask {
    cells: Vec<bool>,
    nx: usize,
    ny: usize,
}

impl OccupancyMask {
    /// Initialize the mask for a field.
    ///
    /// Marks the full first/last row and first/last column (the domain
    /// boundary), plus every cell where both velocity components are
    /// exactly zero (undefined direction).
    pub fn for_field(field: &VectorField) -> Self {
        let nx = field.nx();
        let ny = field.ny();
        let mut cells = vec![false; nx * ny];

        for i in 0..nx {
            cells[i] = true; // first row
            cells[(ny - 1) * nx + i] = true; // last row
        }
        for j in 0..ny {
            cells[j * nx] = true; // first column
            cells[j * nx + nx - 1] = true; // last column
        }

        for j in 0..ny {
            for i in 0..nx {
                let (u, v) = field.at(i, j);
                if u == 0.0 && v == 0.0 {
                    cells[j * nx + i] = true;
                }
            }
        }

        Self { cells, nx, ny }
    }

    #[inline]
    pub fn is_occupied(&self, i: usize, j: usize) -> bool {
        self.cells[j * self.nx + i]
    }

    /// Mark a single cell occupied.
    #[inline]
    pub fn mark(&mut self, i: usize, j: usize) {
        self.cells[j * self.nx + i] = true;
    }

    /// Mark the `spacing x spacing` block starting at `(i, j)` occupied,
    /// clipped at the grid edges.
    pub fn mark_block(&mut self, i: usize, j: usize, spacing: usize) {
        let i_end = (i + spacing).min(self.nx);
        let j_end = (j + spacing).min(self.ny);
        for jj in j..j_end {
            for ii in i..i_end {
                self.cells[jj * self.nx + ii] = true;
            }
        }
    }

    /// First unoccupied cell in row-major scan order, if any.
    pub fn first_unoccupied(&self) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|&occupied| !occupied)
            .map(|idx| (idx % self.nx, idx / self.nx))
    }

    /// Number of cells still unoccupied.
    pub fn remaining(&self) -> usize {
        self.cells.iter().filter(|&&occupied| !occupied).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_field(nx: usize, ny: usize) -> VectorField {
        let x: Vec<f64> = (0..nx).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..ny).map(|j| j as f64).collect();
        VectorField::new(x, y, vec![1.0; nx * ny], vec![0.0; nx * ny]).unwrap()
    }

    #[test]
    fn test_boundary_marked() {
        let field = uniform_field(5, 4);
        let mask = OccupancyMask::for_field(&field);

        for i in 0..5 {
            assert!(mask.is_occupied(i, 0));
            assert!(mask.is_occupied(i, 3));
        }
        for j in 0..4 {
            assert!(mask.is_occupied(0, j));
            assert!(mask.is_occupied(4, j));
        }
        // Interior starts free
        assert!(!mask.is_occupied(1, 1));
        assert!(!mask.is_occupied(3, 2));
    }

    #[test]
    fn test_zero_velocity_marked() {
        let x: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let y = x.clone();
        let mut u = vec![1.0f32; 25];
        let mut v = vec![0.5f32; 25];
        // Still a null vector at interior cell (2, 2)
        u[2 * 5 + 2] = 0.0;
        v[2 * 5 + 2] = 0.0;
        // Single zero component is not a null vector
        u[5 + 1] = 0.0;

        let field = VectorField::new(x, y, u, v).unwrap();
        let mask = OccupancyMask::for_field(&field);
        assert!(mask.is_occupied(2, 2));
        assert!(!mask.is_occupied(1, 1));
    }

    #[test]
    fn test_mark_block_clips_at_edges() {
        let field = uniform_field(5, 5);
        let mut mask = OccupancyMask::for_field(&field);
        mask.mark_block(3, 3, 4);
        assert!(mask.is_occupied(3, 3));
        assert!(mask.is_occupied(4, 4));
        assert!(mask.first_unoccupied().is_some());
    }

    #[test]
    fn test_first_unoccupied_row_major() {
        let field = uniform_field(5, 5);
        let mut mask = OccupancyMask::for_field(&field);
        assert_eq!(mask.first_unoccupied(), Some((1, 1)));

        mask.mark(1, 1);
        assert_eq!(mask.first_unoccupied(), Some((2, 1)));

        mask.mark(2, 1);
        mask.mark(3, 1);
        assert_eq!(mask.first_unoccupied(), Some((1, 2)));
    }

    #[test]
    fn test_remaining_decreases_to_zero() {
        let field = uniform_field(4, 4);
        let mut mask = OccupancyMask::for_field(&field);
        assert_eq!(mask.remaining(), 4);

        mask.mark_block(1, 1, 2);
        assert_eq!(mask.remaining(), 0);
        assert_eq!(mask.first_unoccupied(), None);
    }
}
