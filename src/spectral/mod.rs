//! Deep-water horizon waves from a Phillips spectrum.
//!
//! Amplitudes are drawn once per wavevector; every step re-evaluates their
//! phases at the current time and runs one 2-D inverse FFT. The result tiles
//! seamlessly and is packed into an RGBA normal/height texture.

mod field;
mod normals;

pub use field::SpectralWaveField;
