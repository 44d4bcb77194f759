//! Animated streamline frame sequences.
//!
//! Reproduces the phase-cycling coloring of the streamline animation:
//! each segment's gray level follows its cumulative arc length along the
//! line, and the whole pattern slides forward a fixed phase step per
//! frame, so the lines appear to flow.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tiny_skia::{LineCap, Paint, PathBuilder, Stroke, Transform};
use tracing::{debug, info};

use flow_common::{BoundingBox, FlowResult};
use tracer::Streamline;

use crate::polyline::{new_canvas, project_point};

/// Configuration for animated streamline rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Phase advance per frame (default: 0.05)
    pub speed: f64,
    /// Arc length to color-cycle scale (default: 1.5)
    pub length_scale: f64,
    /// Line width in pixels
    pub line_width: f32,
    pub anti_alias: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed: 0.05,
            length_scale: 1.5,
            line_width: 1.0,
            anti_alias: true,
        }
    }
}

/// A streamline prepared for frame rendering: projected to pixel space
/// with per-segment cumulative arc lengths (in world units) and a fixed
/// per-line phase offset.
#[derive(Debug, Clone)]
pub struct AnimatedLine {
    points: Vec<(f32, f32)>,
    /// Cumulative arc length at the end of each segment; len = points - 1
    cum_lengths: Vec<f64>,
    phase: f64,
}

impl AnimatedLine {
    pub fn segment_count(&self) -> usize {
        self.cum_lengths.len()
    }
}

/// Project streamlines and precompute their segment arc lengths.
///
/// `phase_for` supplies the per-line phase offset (the reference script
/// drew it from a uniform distribution; a deterministic function keeps
/// frames reproducible). Lines with fewer than 2 points are dropped.
pub fn prepare_lines<F>(
    lines: &[Streamline],
    bbox: &BoundingBox,
    width: usize,
    height: usize,
    phase_for: F,
) -> Vec<AnimatedLine>
where
    F: Fn(usize) -> f64,
{
    let mut prepared = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        if line.len() < 2 {
            continue;
        }

        let points: Vec<(f32, f32)> = line
            .points()
            .map(|(x, y)| project_point(x, y, bbox, width, height))
            .collect();

        let mut cum_lengths = Vec::with_capacity(line.len() - 1);
        let mut total = 0.0;
        for k in 1..line.len() {
            let dx = line.xs[k] - line.xs[k - 1];
            let dy = line.ys[k] - line.ys[k - 1];
            total += dx.hypot(dy);
            cum_lengths.push(total);
        }

        prepared.push(AnimatedLine {
            points,
            cum_lengths,
            phase: phase_for(idx),
        });
    }

    debug!(lines = prepared.len(), "prepared animated streamlines");
    prepared
}

/// Gray level of a segment at a given frame phase: `(L * scale + phase) % 1`.
fn segment_gray(cum_length: f64, phase: f64, config: &AnimationConfig) -> u8 {
    let v = (cum_length + phase) * config.length_scale;
    let v = v.rem_euclid(1.0);
    (v * 255.0) as u8
}

/// Render one frame of the sequence as RGBA pixels.
pub fn render_frame(
    lines: &[AnimatedLine],
    width: usize,
    height: usize,
    frame: usize,
    config: &AnimationConfig,
) -> FlowResult<Vec<u8>> {
    let mut pixmap = new_canvas(width, height)?;

    let stroke = Stroke {
        width: config.line_width,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };

    let frame_phase = config.speed * frame as f64;

    for line in lines {
        for (k, &cum) in line.cum_lengths.iter().enumerate() {
            let gray = segment_gray(cum, line.phase + frame_phase, config);

            let mut paint = Paint::default();
            paint.set_color_rgba8(gray, gray, gray, 255);
            paint.anti_alias = config.anti_alias;

            let (x0, y0) = line.points[k];
            let (x1, y1) = line.points[k + 1];
            let mut pb = PathBuilder::new();
            pb.move_to(x0, y0);
            pb.line_to(x1, y1);
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
    }

    Ok(pixmap.data().to_vec())
}

/// Render an n-frame sequence, one RGBA buffer per frame.
///
/// Frames are independent, so the sequence renders in parallel.
pub fn render_frames(
    lines: &[AnimatedLine],
    width: usize,
    height: usize,
    frames: usize,
    config: &AnimationConfig,
) -> FlowResult<Vec<Vec<u8>>> {
    let rendered: FlowResult<Vec<Vec<u8>>> = (0..frames)
        .into_par_iter()
        .map(|frame| render_frame(lines, width, height, frame, config))
        .collect();

    let rendered = rendered?;
    info!(
        frames = rendered.len(),
        width = width,
        height = height,
        "rendered animation sequence"
    );
    Ok(rendered)
}
