//! Streamline tracing over gridded 2D vector fields.
//!
//! Given U/V wind component grids on uniform coordinate axes, produces a
//! set of streamlines whose density fills the domain at a configurable
//! minimum spacing, without the caller choosing seed points. Pure CPU
//! computation: no I/O, deterministic, single-threaded.

pub mod field;
pub mod mask;
pub mod trace;

pub use field::VectorField;
pub use mask::OccupancyMask;
pub use trace::{trace_all, Streamline, TracerConfig};
