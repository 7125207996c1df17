//! Error types for construction-time failures.
//!
//! Per-frame numeric problems never surface here; the solver resolves them
//! with fallbacks and counts them in its frame statistics.

/// Errors raised while building or exporting simulation state.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Spectral grid size must be a power of two.
    #[error("spectral grid size must be a power of two, got {0}")]
    SpectrumSizeNotPowerOfTwo(usize),

    /// Body face with fewer than three vertices.
    #[error("face {face} has {count} vertices, need at least 3")]
    DegenerateFace { face: usize, count: usize },

    /// Body face references a vertex that does not exist.
    #[error("face {face} references vertex {index} but mesh has {len} vertices")]
    VertexIndexOutOfRange { face: usize, index: u32, len: usize },

    /// Output buffer has the wrong size.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Image export failed.
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for simulation construction and export.
pub type Result<T> = std::result::Result<T, SimError>;

pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            reason: format!("must be finite and > 0, got {value}"),
        })
    }
}
