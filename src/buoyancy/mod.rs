//! Rigid body buoyancy and waterline footprint extraction.

mod body;
mod clip;
mod coupler;
mod hull;

pub use body::{BodyMesh, RigidBody};
pub use clip::{clip_triangle, signed_tetrahedron_volume, submerged_volume, tetrahedron_volume};
pub use coupler::BuoyancyCoupler;
pub use hull::compute_convex_footprint;
