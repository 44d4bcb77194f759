//! Gradient/heatmap rendering for gridded weather data.

use flow_common::{BoundingBox, FlowError, FlowResult, GridAxes};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Parse a `#rrggbb` hex string into an opaque color.
    pub fn from_hex(hex: &str) -> FlowResult<Self> {
        let s = hex.trim_start_matches('#');
        if s.len() != 6 {
            return Err(FlowError::InvalidConfig(format!(
                "expected #rrggbb hex color, got '{}'",
                hex
            )));
        }
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&s[range], 16).map_err(|_| {
                FlowError::InvalidConfig(format!("invalid hex color '{}'", hex))
            })
        };
        Ok(Self::new(parse(0..2)?, parse(2..4)?, parse(4..6)?, 255))
    }
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)) as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)) as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)) as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)) as u8,
    )
}

/// Subset a data grid to a geographic bounding box.
///
/// Slices the rows/columns whose axis coordinates cover the bbox and
/// returns the subset with its matching axes.
///
/// # Arguments
/// - `data`: Input grid data, row-major `(ny, nx)` matching `axes`
/// - `axes`: Coordinate axes of the full grid
/// - `bbox`: Region of interest in axis units
pub fn subset_grid(
    data: &[f32],
    axes: &GridAxes,
    bbox: &BoundingBox,
) -> FlowResult<(Vec<f32>, GridAxes)> {
    let nx = axes.nx();
    let expected = nx * axes.ny();
    if data.len() != expected {
        return Err(FlowError::ShapeMismatch {
            expected,
            actual: data.len(),
        });
    }

    let (xr, yr) = axes.subset(bbox)?;

    let mut subset = Vec::with_capacity(xr.len() * yr.len());
    for j in yr.clone() {
        let row = j * nx;
        subset.extend_from_slice(&data[row + xr.start..row + xr.end]);
    }

    let sub_axes = GridAxes::new(
        axes.x()[xr.clone()].to_vec(),
        axes.y()[yr.clone()].to_vec(),
    )?;
    Ok((subset, sub_axes))
}

/// Resample grid data to a different resolution using bilinear interpolation.
pub fn resample_grid(
    data: &[f32],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f32> {
    if src_width == dst_width && src_height == dst_height {
        return data.to_vec();
    }

    let mut output = vec![0.0f32; dst_width * dst_height];

    let x_ratio = (src_width - 1) as f32 / (dst_width - 1).max(1) as f32;
    let y_ratio = (src_height - 1) as f32 / (dst_height - 1).max(1) as f32;

    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x1 = src_x.floor() as usize;
            let y1 = src_y.floor() as usize;
            let x2 = (x1 + 1).min(src_width - 1);
            let y2 = (y1 + 1).min(src_height - 1);

            let dx = src_x - x1 as f32;
            let dy = src_y - y1 as f32;

            // Tolerate short input buffers instead of panicking
            let v11 = data.get(y1 * src_width + x1).copied().unwrap_or(0.0);
            let v21 = data.get(y1 * src_width + x2).copied().unwrap_or(0.0);
            let v12 = data.get(y2 * src_width + x1).copied().unwrap_or(0.0);
            let v22 = data.get(y2 * src_width + x2).copied().unwrap_or(0.0);

            let v1 = v11 * (1.0 - dx) + v21 * dx;
            let v2 = v12 * (1.0 - dx) + v22 * dx;
            output[y * dst_width + x] = v1 * (1.0 - dy) + v2 * dy;
        }
    }

    output
}

/// A discrete stepped palette: contour-interval levels with one color
/// per bucket, plus dedicated under/over colors.
///
/// `levels` must be ascending and one element longer than `colors` is
/// short of bounding every bucket: a value in `[levels[k], levels[k+1])`
/// maps to `colors[k]`; below the first level maps to `under`, at or
/// above the last to `over`.
#[derive(Debug, Clone)]
pub struct DiscretePalette {
    pub levels: Vec<f32>,
    pub colors: Vec<Color>,
    pub under: Color,
    pub over: Color,
}

impl DiscretePalette {
    pub fn new(
        levels: Vec<f32>,
        colors: Vec<Color>,
        under: Color,
        over: Color,
    ) -> FlowResult<Self> {
        if levels.len() != colors.len() + 1 {
            return Err(FlowError::InvalidConfig(format!(
                "palette needs len(levels) == len(colors) + 1, got {} levels and {} colors",
                levels.len(),
                colors.len()
            )));
        }
        if levels.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FlowError::InvalidConfig(
                "palette levels must be strictly ascending".to_string(),
            ));
        }
        Ok(Self {
            levels,
            colors,
            under,
            over,
        })
    }

    /// The 12-step isotach palette (wind speed in knots, 5 kt interval).
    pub fn isotach_knots() -> Self {
        let hex = [
            "#e7f2f4", "#ceeaee", "#b6e2e8", "#abdcff", "#a4d685", "#9cd04e", "#abcf2a",
            "#c9d21b", "#e8d50c", "#ffd100", "#ffba00", "#ffa200",
        ];
        let colors = hex
            .iter()
            .map(|h| Color::from_hex(h).expect("static palette hex"))
            .collect();
        let levels = (0..=60).step_by(5).map(|v| v as f32).collect();

        Self {
            levels,
            colors,
            under: Color::from_hex("#fffafa").expect("static palette hex"),
            over: Color::from_hex("#ff8c00").expect("static palette hex"),
        }
    }

    /// Color for a data value.
    pub fn color_for(&self, value: f32) -> Color {
        if value < self.levels[0] {
            return self.under;
        }
        for (k, window) in self.levels.windows(2).enumerate() {
            if value < window[1] {
                return self.colors[k];
            }
        }
        self.over
    }
}

/// Wind speed color ramp (m/s), continuous.
pub fn wind_speed_color(speed_ms: f32) -> Color {
    // 0 m/s calm gray, 5 light cyan, 10 yellow, 15 orange, 20+ dark red
    match speed_ms {
        s if s < 0.0 => Color::new(200, 200, 200, 255),
        s if s < 5.0 => interpolate_color(
            Color::new(200, 200, 200, 255),
            Color::new(0, 200, 255, 255),
            s / 5.0,
        ),
        s if s < 10.0 => interpolate_color(
            Color::new(0, 200, 255, 255),
            Color::new(255, 255, 0, 255),
            (s - 5.0) / 5.0,
        ),
        s if s < 15.0 => interpolate_color(
            Color::new(255, 255, 0, 255),
            Color::new(255, 165, 0, 255),
            (s - 10.0) / 5.0,
        ),
        s if s < 20.0 => interpolate_color(
            Color::new(255, 165, 0, 255),
            Color::new(139, 0, 0, 255),
            (s - 15.0) / 5.0,
        ),
        _ => Color::new(75, 0, 0, 255),
    }
}

/// Render grid data as an RGBA heatmap through a value→color function.
pub fn render_grid<F>(data: &[f32], width: usize, height: usize, color_fn: F) -> Vec<u8>
where
    F: Fn(f32) -> Color,
{
    let mut pixels = vec![0u8; width * height * 4];

    for (idx, &value) in data.iter().take(width * height).enumerate() {
        let color = if value.is_nan() {
            Color::transparent()
        } else {
            color_fn(value)
        };
        let pixel_idx = idx * 4;
        pixels[pixel_idx] = color.r;
        pixels[pixel_idx + 1] = color.g;
        pixels[pixel_idx + 2] = color.b;
        pixels[pixel_idx + 3] = color.a;
    }

    pixels
}

/// Render a scalar grid through a discrete stepped palette.
pub fn render_with_palette(
    data: &[f32],
    width: usize,
    height: usize,
    palette: &DiscretePalette,
) -> Vec<u8> {
    render_grid(data, width, height, |v| palette.color_for(v))
}
