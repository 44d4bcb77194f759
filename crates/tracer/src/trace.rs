//! Streamline integration over a vector field.
//!
//! Fixed-step marching along the direction field: at each step the
//! velocity is sampled bilinearly, the heading is `atan2(v, u)`, and the
//! position advances a constant arc length. Each seed is traced forward
//! and backward until the march leaves the domain, hits the step cap, or
//! (optionally) closes back on itself.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use flow_common::{FlowError, FlowResult};

use crate::field::VectorField;
use crate::mask::OccupancyMask;

/// Loop detection runs every this many steps.
const LOOP_CHECK_INTERVAL: usize = 10;

/// A candidate point closer than this fraction of the step length to an
/// earlier point of the same half-branch counts as a closed loop.
const LOOP_RADIUS_FACTOR: f64 = 0.9;

/// Configuration for streamline tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracerConfig {
    /// Distance between successive points along a line, in units of the
    /// geometric mean grid spacing (default: 1.0).
    pub step_length: f64,
    /// Minimum seed/streamline separation in grid cells (default: 4).
    pub spacing: usize,
    /// Hard cap on points per streamline; each half-branch stops after
    /// `max_points / 2` steps (default: 1000).
    pub max_points: usize,
    /// Terminate a half-branch early when it returns close to one of its
    /// own earlier points (default: false).
    pub detect_loops: bool,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            step_length: 1.0,
            spacing: 4,
            max_points: 1000,
            detect_loops: false,
        }
    }
}

impl TracerConfig {
    fn validate(&self) -> FlowResult<()> {
        if !(self.step_length > 0.0) || !self.step_length.is_finite() {
            return Err(FlowError::InvalidConfig(format!(
                "step_length must be positive and finite, got {}",
                self.step_length
            )));
        }
        if self.spacing == 0 {
            return Err(FlowError::InvalidConfig(
                "spacing must be at least 1 grid cell".to_string(),
            ));
        }
        if self.max_points < 2 {
            return Err(FlowError::InvalidConfig(format!(
                "max_points must be at least 2, got {}",
                self.max_points
            )));
        }
        Ok(())
    }
}

/// An ordered sequence of points approximating an integral curve.
///
/// Built as reversed backward branch + seed + forward branch;
/// `seed_index` locates the seed point within the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Streamline {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub seed_index: usize,
}

impl Streamline {
    /// Number of points in the line.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// The seed point the trace started from.
    pub fn seed(&self) -> (f64, f64) {
        (self.xs[self.seed_index], self.ys[self.seed_index])
    }

    /// Iterate over `(x, y)` points in order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}

/// Trace a set of streamlines covering the field at the configured
/// minimum spacing.
///
/// Seeds are chosen automatically: the first unoccupied cell in
/// row-major scan order, repeated until the occupancy mask is full.
/// Every trace marks occupancy blocks as it passes through cells, which
/// bounds the total count and guarantees termination. The mask is local
/// working state of this call; the field is never mutated.
pub fn trace_all(field: &VectorField, config: &TracerConfig) -> FlowResult<Vec<Streamline>> {
    config.validate()?;

    let dr = config.step_length * (field.dx() * field.dy()).sqrt();
    let mut mask = OccupancyMask::for_field(field);
    let mut streamlines = Vec::new();

    debug!(
        nx = field.nx(),
        ny = field.ny(),
        dr = dr,
        free_cells = mask.remaining(),
        "starting streamline seeding"
    );

    while let Some((i, j)) = mask.first_unoccupied() {
        // Marking the seed cell up front guarantees outer-loop progress
        // even if the march terminates without taking a step.
        mask.mark(i, j);

        let x0 = field.axes().x()[i];
        let y0 = field.axes().y()[j];
        let line = trace_from_seed(field, &mut mask, config, dr, x0, y0);

        debug!(
            seed_i = i,
            seed_j = j,
            points = line.len(),
            "traced streamline"
        );
        streamlines.push(line);
    }

    info!(
        streamlines = streamlines.len(),
        nx = field.nx(),
        ny = field.ny(),
        "streamline tracing complete"
    );

    Ok(streamlines)
}

/// Trace a full streamline extending in both directions from a seed.
fn trace_from_seed(
    field: &VectorField,
    mask: &mut OccupancyMask,
    config: &TracerConfig,
    dr: f64,
    x0: f64,
    y0: f64,
) -> Streamline {
    let (fwd_x, fwd_y) = trace_half_branch(field, mask, config, dr, x0, y0, 1.0);
    let (mut bwd_x, mut bwd_y) = trace_half_branch(field, mask, config, dr, x0, y0, -1.0);

    bwd_x.reverse();
    bwd_y.reverse();
    let seed_index = bwd_x.len();

    let mut xs = bwd_x;
    xs.push(x0);
    xs.extend_from_slice(&fwd_x);

    let mut ys = bwd_y;
    ys.push(y0);
    ys.extend_from_slice(&fwd_y);

    Streamline { xs, ys, seed_index }
}

/// Trace a half-branch in one direction (`sign` is +1 or -1).
///
/// Marches while the position stays strictly inside the domain; each
/// sample marks a `spacing x spacing` occupancy block at the containing
/// cell. The recorded sequence excludes the seed itself.
fn trace_half_branch(
    field: &VectorField,
    mask: &mut OccupancyMask,
    config: &TracerConfig,
    dr: f64,
    x0: f64,
    y0: f64,
    sign: f64,
) -> (Vec<f64>, Vec<f64>) {
    let bounds = field.bounds();

    let mut xs = Vec::new();
    let mut ys = Vec::new();

    let mut x = x0;
    let mut y = y0;
    let mut count = 0usize;

    while bounds.contains_point_open(x, y) {
        let (ci, cj) = field.cell_of(x, y);
        mask.mark_block(ci, cj, config.spacing);

        let (u, v) = field.interpolate(x, y);
        let theta = (v as f64).atan2(u as f64);

        x += sign * dr * theta.cos();
        y += sign * dr * theta.sin();
        xs.push(x);
        ys.push(y);

        count += 1;

        if config.detect_loops && count % LOOP_CHECK_INTERVAL == 0 && closes_loop(&xs, &ys, dr) {
            break;
        }

        if count > config.max_points / 2 {
            break;
        }
    }

    (xs, ys)
}

/// Check whether the latest point lies within `0.9 * dr` of any earlier
/// point of the same half-branch.
///
/// Scope is deliberately limited to one half-branch: the forward and
/// backward branches of a seed are not compared against each other, nor
/// against other streamlines.
fn closes_loop(xs: &[f64], ys: &[f64], dr: f64) -> bool {
    let n = xs.len();
    if n < 2 {
        return false;
    }
    let (x, y) = (xs[n - 1], ys[n - 1]);
    let radius = LOOP_RADIUS_FACTOR * dr;

    xs[..n - 1]
        .iter()
        .zip(ys[..n - 1].iter())
        .any(|(&xj, &yj)| (x - xj).hypot(y - yj) < radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_eastward_5x5() -> VectorField {
        let x: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let y = x.clone();
        VectorField::new(x, y, vec![1.0; 25], vec![0.0; 25]).unwrap()
    }

    /// Stable-focus rotational field on a 25x25 grid spanning -6..6.
    /// Orbits spiral inward onto an annulus around the origin, which is
    /// the regime where self-intersection detection fires.
    fn converging_rotation() -> VectorField {
        let n = 25;
        let coords: Vec<f64> = (0..n).map(|i| -6.0 + 0.5 * i as f64).collect();
        let mut u = Vec::with_capacity(n * n);
        let mut v = Vec::with_capacity(n * n);
        for &yv in &coords {
            for &xv in &coords {
                u.push((-yv - 0.5 * xv) as f32);
                v.push((xv - 0.5 * yv) as f32);
            }
        }
        VectorField::new(coords.clone(), coords, u, v).unwrap()
    }

    #[test]
    fn test_uniform_field_single_horizontal_streamline() {
        let field = uniform_eastward_5x5();
        let lines = trace_all(&field, &TracerConfig::default()).unwrap();

        // The default spacing-4 occupancy block from the first seed
        // covers the whole 3x3 interior, so exactly one line is traced.
        assert_eq!(lines.len(), 1);

        let line = &lines[0];
        // First unoccupied interior cell in row-major order is (1, 1)
        assert_eq!(line.seed(), (1.0, 1.0));

        // Straight horizontal line spanning the x extent at the seed row
        for (x, y) in line.points() {
            assert!((y - 1.0).abs() < 1e-9, "streamline left its row: y={}", y);
            assert!((-1.0..=5.0).contains(&x));
        }
        assert!((line.xs[0] - 0.0).abs() < 1e-9);
        assert!((line.xs[line.len() - 1] - 4.0).abs() < 1e-9);

        // backward(1) + seed + forward(3)
        assert_eq!(line.len(), 5);
        assert_eq!(line.seed_index, 1);
    }

    #[test]
    fn test_uniform_diagonal_field_is_straight() {
        let n = 20;
        let coords: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let field = VectorField::new(
            coords.clone(),
            coords,
            vec![1.0; n * n],
            vec![1.0; n * n],
        )
        .unwrap();

        let lines = trace_all(&field, &TracerConfig::default()).unwrap();
        assert!(!lines.is_empty());

        // Every traced line must follow atan2(1, 1) = 45 degrees:
        // y - x is constant along the line.
        for line in &lines {
            let offset = line.ys[0] - line.xs[0];
            for (x, y) in line.points() {
                assert!(
                    (y - x - offset).abs() < 1e-9,
                    "point ({}, {}) off the 45-degree line",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_zero_field_produces_no_streamlines() {
        let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let y = x.clone();
        let field = VectorField::new(x, y, vec![0.0; 64], vec![0.0; 64]).unwrap();

        let lines = trace_all(&field, &TracerConfig::default()).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_boundary_cells_never_seeded() {
        let field = converging_rotation();
        let bounds = field.bounds();
        let lines = trace_all(&field, &TracerConfig::default()).unwrap();

        for line in &lines {
            let (sx, sy) = line.seed();
            assert!(
                bounds.contains_point_open(sx, sy),
                "seed ({}, {}) on or outside the domain boundary",
                sx,
                sy
            );
        }
    }

    #[test]
    fn test_branch_arithmetic() {
        let field = converging_rotation();
        let lines = trace_all(&field, &TracerConfig::default()).unwrap();
        assert!(!lines.is_empty());

        for line in &lines {
            assert_eq!(line.xs.len(), line.ys.len());
            assert!(line.seed_index < line.len());
            // Half-branch cap: backward and forward each hold at most
            // max_points / 2 + 1 points.
            let cap = 1000 / 2 + 1;
            assert!(line.seed_index <= cap);
            assert!(line.len() - line.seed_index - 1 <= cap);
        }
    }

    #[test]
    fn test_detect_loops_terminates_converging_orbits() {
        let field = converging_rotation();
        let config = TracerConfig {
            detect_loops: true,
            ..TracerConfig::default()
        };
        let lines = trace_all(&field, &config).unwrap();
        assert!(!lines.is_empty());

        // With loop detection every branch ends long before the step
        // cap: either it leaves the domain or it re-enters the 0.9*dr
        // neighborhood of an earlier point on the same branch.
        for line in &lines {
            assert!(
                line.len() < config.max_points / 2,
                "branch ran {} points despite loop detection",
                line.len()
            );
        }
    }

    #[test]
    fn test_without_detection_bounded_orbit_hits_step_cap() {
        let field = converging_rotation();
        let lines = trace_all(&field, &TracerConfig::default()).unwrap();

        // Inward-spiraling orbits never leave the domain, so without
        // loop detection at least one branch runs to the cap.
        let longest = lines.iter().map(|l| l.len()).max().unwrap();
        assert!(
            longest > 1000 / 2,
            "expected a capped branch, longest was {} points",
            longest
        );
    }

    #[test]
    fn test_trace_is_deterministic() {
        let field = converging_rotation();
        let config = TracerConfig {
            detect_loops: true,
            ..TracerConfig::default()
        };
        let a = trace_all(&field, &config).unwrap();
        let b = trace_all(&field, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let field = uniform_eastward_5x5();

        let zero_spacing = TracerConfig {
            spacing: 0,
            ..TracerConfig::default()
        };
        assert!(matches!(
            trace_all(&field, &zero_spacing),
            Err(FlowError::InvalidConfig(_))
        ));

        let zero_step = TracerConfig {
            step_length: 0.0,
            ..TracerConfig::default()
        };
        assert!(trace_all(&field, &zero_step).is_err());

        let tiny_cap = TracerConfig {
            max_points: 1,
            ..TracerConfig::default()
        };
        assert!(trace_all(&field, &tiny_cap).is_err());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = TracerConfig {
            step_length: 0.5,
            spacing: 6,
            max_points: 400,
            detect_loops: true,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: TracerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.spacing, 6);
        assert_eq!(back.max_points, 400);
        assert!(back.detect_loops);
        assert!((back.step_length - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fine_spacing_fills_domain_with_more_lines() {
        let field = converging_rotation();

        let coarse = trace_all(&field, &TracerConfig::default()).unwrap();
        let fine = trace_all(
            &field,
            &TracerConfig {
                spacing: 1,
                ..TracerConfig::default()
            },
        )
        .unwrap();

        assert!(fine.len() >= coarse.len());
    }
}
