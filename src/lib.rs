//! Harborwave library - coupled shallow-water, spectral horizon and buoyancy
//! simulation

pub mod buoyancy;
pub mod cli;
pub mod error;
pub mod params;
pub mod shallow;
pub mod simulation;
pub mod spectral;
pub mod terrain;

pub use error::{Result, SimError};
pub use simulation::{FrameReport, Simulation};
