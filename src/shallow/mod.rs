//! Shallow-water height field around the viewpoint.
//!
//! A fixed `n`×`n` grid of cells carries water depth and a horizontal
//! velocity. The grid follows the viewpoint in whole-cell steps, reflects off
//! submerged cliffs, absorbs waves at its outer edge, and takes floating body
//! footprints as transient obstacles.

mod footprint;
mod grid;
mod mesh;
mod solver;

pub use footprint::{BodyMotion, CellList, Footprint, RasterStats};
pub use grid::{CellState, GridCell, ShallowWaterGrid, StateCounts};
pub use mesh::{surface_indices, HorizonSkirt, SurfaceVertex};
