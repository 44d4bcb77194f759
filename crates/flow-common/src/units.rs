//! Physical unit conversions applied to gridded fields before rendering.

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f32 = 273.15;

/// Meters per second to knots.
pub const MS_TO_KNOTS: f32 = 1.943_844;

/// Convert a temperature from Kelvin to Celsius.
#[inline]
pub fn kelvin_to_celsius(kelvin: f32) -> f32 {
    kelvin - KELVIN_OFFSET
}

/// Convert a speed from m/s to knots.
#[inline]
pub fn ms_to_knots(ms: f32) -> f32 {
    ms * MS_TO_KNOTS
}

/// Wind speed magnitude from component grids.
///
/// Both slices must have the same length; output is elementwise
/// `sqrt(u^2 + v^2)`.
pub fn wind_speed(u: &[f32], v: &[f32]) -> Vec<f32> {
    debug_assert_eq!(u.len(), v.len());
    u.iter()
        .zip(v.iter())
        .map(|(&u, &v)| (u * u + v * v).sqrt())
        .collect()
}

/// Normalize longitudes from the 0-360 convention to -180..180.
///
/// GFS grids publish longitudes 0..360; plotting extents use -180..180,
/// so values above 180 are shifted down by a full revolution.
pub fn normalize_longitudes(lons: &mut [f64]) {
    for lon in lons.iter_mut() {
        if *lon > 180.0 {
            *lon -= 360.0;
        }
    }
}
