//! CPU rasterization for streamline and gridded-field visualization.
//!
//! Rendering styles:
//! - Gradient/color ramp over scalar grids (wind speed isotachs)
//! - Streamline polylines (tiny-skia stroking)
//! - Animated frame sequences with phase-cycling colors
//!
//! Output is RGBA pixel data plus a hand-rolled PNG encoder.

pub mod animate;
pub mod gradient;
pub mod png;
pub mod polyline;
