//! Shallow-water grid parameters.

use crate::error::{ensure_positive, Result, SimError};

/// Shallow-water grid physics and layout parameters
#[derive(Debug, Clone)]
pub struct GridParams {
    /// Cells per side of the square grid (NUM_CELLS)
    pub num_cells: usize,

    /// Edge length of one cell (meters)
    pub cell_edge_m: f32,

    /// Integration step used by `Simulation::step_frame` (seconds)
    pub time_step_s: f32,

    /// Gravitational acceleration magnitude (m/s²)
    pub gravity_m_per_s2: f32,

    /// World height of the undisturbed water surface (meters)
    pub rest_height_m: f32,

    /// Ground height substituted for negative terrain samples (meters)
    pub flat_ground_m: f32,

    /// Ground step between a water cell and a dry neighbour that makes the
    /// water cell reflecting (meters)
    pub boundary_threshold_m: f32,

    /// Height displaced by a moving hull per object cell (meters)
    pub displaced_height_m: f32,

    /// Width of the absorbing band along the grid edge (cells)
    pub damping_band_cells: usize,

    /// Depth removed from a cell by `add_drop` (meters)
    pub drop_depth_m: f32,

    /// Drops closer than this to any edge are ignored (cells)
    pub drop_edge_margin_cells: usize,

    /// Chance that a recentred-in water cell starts slightly raised
    pub new_cell_jitter_probability: f32,

    /// How far the wake search walks from an object cell (cells)
    pub wake_search_radius_cells: usize,

    /// Body speed / yaw rate below which no wake is generated
    pub motion_epsilon: f32,

    /// Maximum object cells tracked per frame for wake displacement
    pub object_cell_capacity: usize,

    /// Maximum object-boundary cells tracked per frame
    pub object_boundary_capacity: usize,

    /// Seed for edge-cell jitter
    pub seed: u64,
}

impl Default for GridParams {
    fn default() -> Self {
        let num_cells = 120;
        Self {
            num_cells,
            cell_edge_m: 1.5,
            time_step_s: 0.03,
            gravity_m_per_s2: 9.81,
            rest_height_m: 6.0,
            flat_ground_m: 2.0,
            boundary_threshold_m: 6.0,
            displaced_height_m: 0.2,
            damping_band_cells: num_cells / 20,
            drop_depth_m: 0.5,
            drop_edge_margin_cells: 2,
            new_cell_jitter_probability: 0.1,
            wake_search_radius_cells: 5,
            motion_epsilon: 0.001,
            object_cell_capacity: 2000,
            object_boundary_capacity: 500,
            seed: 7,
        }
    }
}

impl GridParams {
    /// Smallest grid the stencils can work with
    pub const MIN_CELLS: usize = 8;

    /// Total world extent of one grid side (meters)
    pub fn extent_m(&self) -> f32 {
        self.num_cells as f32 * self.cell_edge_m
    }

    /// Depth sentinel stored in dry cells
    pub fn dry_water_height(&self) -> f32 {
        self.rest_height_m - self.flat_ground_m
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_cells < Self::MIN_CELLS {
            return Err(SimError::InvalidParameter {
                name: "num_cells",
                reason: format!("need at least {}, got {}", Self::MIN_CELLS, self.num_cells),
            });
        }
        if self.damping_band_cells * 2 >= self.num_cells {
            return Err(SimError::InvalidParameter {
                name: "damping_band_cells",
                reason: format!(
                    "band of {} cells does not fit a {}-cell grid",
                    self.damping_band_cells, self.num_cells
                ),
            });
        }
        ensure_positive("cell_edge_m", self.cell_edge_m)?;
        ensure_positive("time_step_s", self.time_step_s)?;
        ensure_positive("gravity_m_per_s2", self.gravity_m_per_s2)?;
        ensure_positive("rest_height_m", self.rest_height_m)?;
        if !(0.0..=1.0).contains(&self.new_cell_jitter_probability) {
            return Err(SimError::InvalidParameter {
                name: "new_cell_jitter_probability",
                reason: format!("must be in [0, 1], got {}", self.new_cell_jitter_probability),
            });
        }
        Ok(())
    }
}
