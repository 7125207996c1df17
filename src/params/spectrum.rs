//! Deep-water spectral field parameters.

use glam::Vec2;

use crate::error::{ensure_positive, Result, SimError};

/// Phillips-spectrum wave field parameters
#[derive(Debug, Clone)]
pub struct SpectrumParams {
    /// Wavevector samples per side (must be a power of 2)
    pub grid_size: usize,

    /// Side length of the periodic domain (meters)
    pub domain_length_m: f32,

    /// Wind speed driving the spectrum (m/s)
    pub wind_speed_m_per_s: f32,

    /// Wind direction in the XZ plane (normalized on use)
    pub wind_direction: Vec2,

    /// Phillips amplitude constant `A` (dimensionless)
    pub amplitude: f32,

    /// Gravitational acceleration magnitude (m/s²)
    pub gravity_m_per_s2: f32,

    /// Texel spacing used for normal estimation (meters)
    pub normal_cell_distance_m: f32,

    /// Converts elapsed seconds into spectral time
    pub time_scale: f32,

    /// Offset added to the height before it is packed into a byte
    pub height_pack_offset: f32,

    /// Seed for the Gaussian amplitude draws
    pub seed: u64,
}

impl Default for SpectrumParams {
    fn default() -> Self {
        Self {
            grid_size: 64,
            domain_length_m: 256.0,
            wind_speed_m_per_s: 3.0,
            wind_direction: Vec2::X,
            amplitude: 3.0,
            gravity_m_per_s2: 9.81,
            normal_cell_distance_m: 100.0,
            time_scale: 1000.0 / 300.0,
            height_pack_offset: 128.0,
            seed: 42,
        }
    }
}

impl SpectrumParams {
    pub fn validate(&self) -> Result<()> {
        if !self.grid_size.is_power_of_two() || self.grid_size < 4 {
            return Err(SimError::SpectrumSizeNotPowerOfTwo(self.grid_size));
        }
        ensure_positive("domain_length_m", self.domain_length_m)?;
        ensure_positive("wind_speed_m_per_s", self.wind_speed_m_per_s)?;
        ensure_positive("gravity_m_per_s2", self.gravity_m_per_s2)?;
        ensure_positive("normal_cell_distance_m", self.normal_cell_distance_m)?;
        if self.wind_direction.length_squared() <= f32::EPSILON {
            return Err(SimError::InvalidParameter {
                name: "wind_direction",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
