//! Streamline polyline stroking onto RGBA canvases.

use serde::{Deserialize, Serialize};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

use flow_common::{BoundingBox, FlowError, FlowResult};
use tracer::Streamline;

/// Stroke styling for streamline polylines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineStyle {
    /// Line width in pixels
    pub width: f32,
    /// Line color [R, G, B, A]
    pub color: [u8; 4],
    pub anti_alias: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            color: [255, 255, 255, 255],
            anti_alias: true,
        }
    }
}

/// Project a world coordinate into pixel space for a target canvas.
///
/// The y axis flips: world max_y maps to pixel row 0.
#[inline]
pub fn project_point(
    x: f64,
    y: f64,
    bbox: &BoundingBox,
    width: usize,
    height: usize,
) -> (f32, f32) {
    let px = (x - bbox.min_x) / bbox.width() * width as f64;
    let py = (bbox.max_y - y) / bbox.height() * height as f64;
    (px as f32, py as f32)
}

/// Stroke streamlines onto a transparent RGBA canvas.
///
/// Lines with fewer than 2 points are skipped. Points outside the bbox
/// project outside the canvas and are clipped by the rasterizer.
pub fn render_streamlines(
    lines: &[Streamline],
    width: usize,
    height: usize,
    bbox: &BoundingBox,
    style: &LineStyle,
) -> FlowResult<Vec<u8>> {
    let mut pixmap = new_canvas(width, height)?;

    let mut paint = Paint::default();
    paint.set_color_rgba8(style.color[0], style.color[1], style.color[2], style.color[3]);
    paint.anti_alias = style.anti_alias;

    let stroke = Stroke {
        width: style.width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut drawn = 0usize;
    for line in lines {
        if line.len() < 2 {
            continue;
        }

        let mut pb = PathBuilder::new();
        let (px, py) = project_point(line.xs[0], line.ys[0], bbox, width, height);
        pb.move_to(px, py);
        for (x, y) in line.points().skip(1) {
            let (px, py) = project_point(x, y, bbox, width, height);
            pb.line_to(px, py);
        }

        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            drawn += 1;
        }
    }

    debug!(
        streamlines = drawn,
        width = width,
        height = height,
        "stroked streamline canvas"
    );

    Ok(pixmap.data().to_vec())
}

/// Create a transparent canvas, validating the dimensions.
pub(crate) fn new_canvas(width: usize, height: usize) -> FlowResult<Pixmap> {
    let pixmap = Pixmap::new(width as u32, height as u32).ok_or_else(|| {
        FlowError::RenderError(format!("invalid canvas dimensions {}x{}", width, height))
    })?;
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal_line() -> Streamline {
        Streamline {
            xs: vec![0.0, 1.0, 2.0, 3.0, 4.0],
            ys: vec![2.0; 5],
            seed_index: 2,
        }
    }

    #[test]
    fn test_project_point_flips_y() {
        let bbox = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        let (px, py) = project_point(0.0, 4.0, &bbox, 100, 100);
        assert_eq!((px, py), (0.0, 0.0));

        let (px, py) = project_point(4.0, 0.0, &bbox, 100, 100);
        assert_eq!((px, py), (100.0, 100.0));

        let (px, py) = project_point(2.0, 2.0, &bbox, 100, 100);
        assert_eq!((px, py), (50.0, 50.0));
    }

    #[test]
    fn test_render_streamlines_draws_pixels() {
        let bbox = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        let pixels = render_streamlines(
            &[horizontal_line()],
            64,
            64,
            &bbox,
            &LineStyle::default(),
        )
        .unwrap();

        assert_eq!(pixels.len(), 64 * 64 * 4);
        let non_transparent = pixels.chunks(4).filter(|c| c[3] > 0).count();
        assert!(non_transparent > 0, "expected stroked pixels");

        // The line sits at world y=2 -> pixel row 32; check that the
        // drawn pixels are concentrated near that row.
        let mut rows_with_ink = Vec::new();
        for row in 0..64 {
            let start = row * 64 * 4;
            let has_ink = pixels[start..start + 64 * 4]
                .chunks(4)
                .any(|c| c[3] > 0);
            if has_ink {
                rows_with_ink.push(row);
            }
        }
        assert!(rows_with_ink.iter().all(|&r| (30..=34).contains(&r)));
    }

    #[test]
    fn test_short_lines_skipped() {
        let bbox = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        let dot = Streamline {
            xs: vec![2.0],
            ys: vec![2.0],
            seed_index: 0,
        };
        let pixels = render_streamlines(&[dot], 32, 32, &bbox, &LineStyle::default()).unwrap();
        assert!(pixels.chunks(4).all(|c| c[3] == 0));
    }

    #[test]
    fn test_style_json_round_trip() {
        let style = LineStyle {
            width: 2.5,
            color: [10, 20, 30, 128],
            anti_alias: false,
        };
        let json = serde_json::to_string(&style).unwrap();
        let back: LineStyle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.color, [10, 20, 30, 128]);
        assert!(!back.anti_alias);
        assert!((back.width - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_canvas_rejected() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(render_streamlines(&[], 0, 32, &bbox, &LineStyle::default()).is_err());
    }
}
