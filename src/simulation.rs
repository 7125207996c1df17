//! Per-frame orchestration of the grid, the horizon field and the body.

use glam::{Vec2, Vec3};
use log::debug;

use crate::buoyancy::{BuoyancyCoupler, RigidBody};
use crate::error::Result;
use crate::params::{GridParams, SpectrumParams};
use crate::shallow::{RasterStats, ShallowWaterGrid};
use crate::spectral::SpectralWaveField;
use crate::terrain::Terrain;

/// What one `advance` call did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Frames completed, including this one
    pub frame: u64,
    /// Simulated seconds since start
    pub elapsed_s: f32,
    /// Whole-cell recentring shift along (X, Z)
    pub grid_shift: (i32, i32),
    /// Non-finite values the solver replaced
    pub repaired_values: usize,
    pub submerged_volume: f32,
    /// Vertices of the published footprint polygon
    pub footprint_points: usize,
    pub raster: RasterStats,
    /// World height of the body origin, if there is a body
    pub body_height: Option<f32>,
}

/// Coupled water simulation around a moving viewpoint
pub struct Simulation<T: Terrain> {
    grid: ShallowWaterGrid,
    spectral: SpectralWaveField,
    coupler: BuoyancyCoupler,
    body: Option<RigidBody>,
    terrain: T,
    elapsed_s: f32,
    frame: u64,
}

impl<T: Terrain> Simulation<T> {
    /// Build grid and horizon; the spectral field is evaluated at time zero
    pub fn new(grid: GridParams, spectrum: SpectrumParams, terrain: T) -> Result<Self> {
        let grid = ShallowWaterGrid::new(grid, &terrain)?;
        let mut spectral = SpectralWaveField::new(spectrum)?;
        spectral.step(0.0);

        Ok(Self {
            grid,
            spectral,
            coupler: BuoyancyCoupler::new(),
            body: None,
            terrain,
            elapsed_s: 0.0,
            frame: 0,
        })
    }

    /// Add a floating body to couple with the grid
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Run one frame: recentre, step the grid, float the body, stamp its
    /// footprint into the grid, then evaluate the horizon.
    pub fn advance(&mut self, view: Vec3, dt: f32) -> FrameReport {
        let grid_shift = self.grid.recenter(view, &self.terrain);
        let repaired_values = self.grid.step(dt);

        let mut report = FrameReport {
            grid_shift,
            repaired_values,
            ..FrameReport::default()
        };

        if let Some(body) = self.body.as_mut() {
            let water_level = self.grid.rest_height();
            body.advance_pose(self.grid.drift_velocity());

            let volume = self.coupler.integrate_buoyancy(body, water_level);
            self.coupler.integrate_force(body, volume, dt);
            self.coupler.compute_convex_footprint();
            let footprint = self.coupler.publish(body);

            report.submerged_volume = volume;
            report.footprint_points = footprint.points.len();
            report.raster = self.grid.rasterize_footprint(&footprint);
            report.body_height = Some(body.position().y);
        }

        self.elapsed_s += dt;
        self.spectral.step(self.elapsed_s);
        self.frame += 1;

        report.frame = self.frame;
        report.elapsed_s = self.elapsed_s;
        debug!(
            "frame {}: shift {:?}, volume {:.3}, {} object cells",
            report.frame, report.grid_shift, report.submerged_volume, report.raster.object_cells
        );
        report
    }

    /// `advance` with the grid's configured time step
    pub fn step_frame(&mut self, view: Vec3) -> FrameReport {
        let dt = self.grid.params().time_step_s;
        self.advance(view, dt)
    }

    /// Push the surface down at world `(x, z)`
    pub fn add_drop(&mut self, x: f32, z: f32) -> bool {
        self.grid.add_drop(x, z)
    }

    pub fn grid(&self) -> &ShallowWaterGrid {
        &self.grid
    }

    pub fn spectral(&self) -> &SpectralWaveField {
        &self.spectral
    }

    pub fn body(&self) -> Option<&RigidBody> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut RigidBody> {
        self.body.as_mut()
    }

    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    /// Water velocity under the body from the last frame
    pub fn object_velocity(&self) -> Vec2 {
        self.grid.drift_velocity()
    }

    pub fn elapsed_s(&self) -> f32 {
        self.elapsed_s
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
