//! Floating body parameters.

use crate::error::{ensure_positive, Result};

/// Rigid body mass properties and buoyancy integration constants
#[derive(Debug, Clone)]
pub struct BodyParams {
    /// Body mass (kg)
    pub mass_kg: f32,

    /// Fluid density (kg/m³)
    pub water_density: f32,

    /// Divisor applied to the buoyant term (mesh units → world)
    pub volume_scale: f32,

    /// Gravitational acceleration magnitude (m/s²)
    pub gravity_m_per_s2: f32,

    /// Per-step multiplier on vertical velocity
    pub vertical_damping: f32,

    /// Fraction of grid drift velocity applied to the body each frame
    pub drift_coupling: f32,

    /// Starting heading (degrees)
    pub initial_yaw_deg: f32,

    /// Starting distance of the body origin below rest height (meters)
    pub initial_draft_m: f32,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            mass_kg: 1.5,
            water_density: 1000.0,
            volume_scale: 1000.0,
            gravity_m_per_s2: 9.81,
            vertical_damping: 0.95,
            drift_coupling: 0.05,
            initial_yaw_deg: 180.0,
            initial_draft_m: 2.0,
        }
    }
}

impl BodyParams {
    /// Submerged volume at which buoyancy balances weight
    pub fn equilibrium_volume(&self) -> f32 {
        self.mass_kg * self.volume_scale / self.water_density
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("mass_kg", self.mass_kg)?;
        ensure_positive("water_density", self.water_density)?;
        ensure_positive("volume_scale", self.volume_scale)?;
        ensure_positive("gravity_m_per_s2", self.gravity_m_per_s2)?;
        ensure_positive("vertical_damping", self.vertical_damping)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equilibrium_volume() {
        let params = BodyParams::default();
        assert!((params.equilibrium_volume() - 1.5).abs() < 1e-6);
        assert!(params.validate().is_ok());
    }
}
