//! Common types and utilities shared across the wind-streamlines crates.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod units;

pub use bbox::BoundingBox;
pub use error::{FlowError, FlowResult};
pub use grid::GridAxes;
