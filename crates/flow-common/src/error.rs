//! Error types for the wind-streamlines crates.

use thiserror::Error;

/// Result type alias using FlowError.
pub type FlowResult<T> = Result<T, FlowError>;

/// Primary error type for field tracing and rendering operations.
#[derive(Debug, Error)]
pub enum FlowError {
    // === Input validation ===
    #[error("Degenerate grid: {0}")]
    DegenerateGrid(String),

    #[error("Grid shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    // === Rendering ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("PNG encoding failed: {0}")]
    PngError(String),
}

// Conversion from common error types
impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::PngError(err.to_string())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::InvalidConfig(format!("JSON error: {}", err))
    }
}
