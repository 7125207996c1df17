//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (meters, seconds, m/s², etc.)
//! - Documented ranges and meanings
//! - A `validate` method checked when the owning system is built

mod body;
mod grid;
mod spectrum;

// Re-export all types
pub use body::BodyParams;
pub use grid::GridParams;
pub use spectrum::SpectrumParams;
