//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::params::{BodyParams, GridParams, SpectrumParams};
use crate::terrain::{FlatTerrain, NoiseTerrain};

/// Sea floor used by the headless runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TerrainKind {
    /// Constant depth everywhere
    Flat,
    /// OpenSimplex shoreline with islands
    Noise,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "harborwave")]
#[command(about = "Headless coupled water simulation", long_about = None)]
pub struct Args {
    /// Number of frames to simulate
    #[arg(long, value_name = "N", default_value = "600")]
    pub frames: u64,

    /// Time step per frame (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "0.03")]
    pub dt: f32,

    /// Seed for spectrum draws, cell jitter and noise terrain
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Sea floor: flat or noise
    #[arg(long, value_enum, default_value = "flat")]
    pub terrain: TerrainKind,

    /// Run without the floating body
    #[arg(long)]
    pub no_boat: bool,

    /// Boat forward speed (meters per frame)
    #[arg(long, value_name = "SPEED", default_value = "0.0")]
    pub throttle: f32,

    /// Boat yaw change per frame (degrees)
    #[arg(long, value_name = "DEGREES", default_value = "0.0")]
    pub turn: f32,

    /// Viewpoint speed along +X when there is no boat to follow (m/s)
    #[arg(long, value_name = "M_PER_S", default_value = "0.0")]
    pub view_speed: f32,

    /// Drop a disturbance next to the view every N frames (0 disables)
    #[arg(long, value_name = "N", default_value = "0")]
    pub drop_every: u64,

    /// Write the final spectral normal texture to this PNG
    #[arg(long, value_name = "PNG")]
    pub dump_normals: Option<PathBuf>,

    /// Log a frame summary every N frames
    #[arg(long, value_name = "N", default_value = "60")]
    pub report_every: u64,
}

impl Args {
    /// Grid parameters for this run
    pub fn grid_params(&self) -> GridParams {
        GridParams {
            time_step_s: self.dt,
            seed: self.seed,
            ..GridParams::default()
        }
    }

    pub fn spectrum_params(&self) -> SpectrumParams {
        SpectrumParams {
            seed: self.seed,
            ..SpectrumParams::default()
        }
    }

    pub fn body_params(&self) -> BodyParams {
        BodyParams::default()
    }

    /// Flat sea floor at the default ground height
    pub fn flat_terrain(&self) -> FlatTerrain {
        FlatTerrain::new(GridParams::default().flat_ground_m)
    }

    /// Shoreline noise seeded from `--seed`
    pub fn noise_terrain(&self) -> NoiseTerrain {
        NoiseTerrain::new(self.seed as u32, 1.0, 6.0, 0.01)
    }
}
