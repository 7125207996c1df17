//! Vertical buoyancy integration and footprint hand-off to the grid.

use glam::{Vec2, Vec3};

use super::body::RigidBody;
use super::clip::submerged_volume;
use super::hull::compute_convex_footprint;
use crate::shallow::Footprint;

/// Couples one rigid body to a flat water plane.
///
/// Holds the per-frame waterline points and their convex hull so their
/// allocations are reused across frames.
#[derive(Debug, Default)]
pub struct BuoyancyCoupler {
    waterline: Vec<Vec3>,
    hull: Vec<Vec2>,
}

impl BuoyancyCoupler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submerged volume of `body` below `water_level`; records the waterline
    pub fn integrate_buoyancy(&mut self, body: &RigidBody, water_level: f32) -> f32 {
        let (bottom, _) = body.extents();
        if water_level <= bottom {
            self.waterline.clear();
            return 0.0;
        }
        submerged_volume(body.mesh(), body.position.y - water_level, &mut self.waterline)
    }

    /// Apply weight and buoyancy for one step and move the body vertically
    pub fn integrate_force(&self, body: &mut RigidBody, submerged_volume: f32, dt: f32) {
        let p = &body.params;
        let gravity = -p.gravity_m_per_s2;
        let force =
            p.mass_kg * gravity - p.water_density * submerged_volume * gravity / p.volume_scale;

        body.vertical_velocity += force * dt / p.mass_kg;
        body.vertical_velocity *= p.vertical_damping;

        let dy = dt * body.vertical_velocity;
        body.position.y += dy;
        body.bottom += dy;
        body.top += dy;
    }

    /// Convex hull of the last waterline, in body-local (x, z)
    pub fn compute_convex_footprint(&mut self) -> &[Vec2] {
        let points: Vec<Vec2> = self.waterline.iter().map(|p| Vec2::new(p.x, p.z)).collect();
        self.hull = compute_convex_footprint(&points);
        &self.hull
    }

    /// Hull in world (x, z) together with the body's motion
    pub fn publish(&self, body: &RigidBody) -> Footprint {
        let points = self
            .hull
            .iter()
            .map(|p| {
                let world = body.to_world(Vec3::new(p.x, 0.0, p.y));
                Vec2::new(world.x, world.z)
            })
            .collect();
        Footprint {
            points,
            motion: body.motion(),
        }
    }

    /// Waterline points from the last `integrate_buoyancy`, body-local
    pub fn waterline_points(&self) -> &[Vec3] {
        &self.waterline
    }

    pub fn hull(&self) -> &[Vec2] {
        &self.hull
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buoyancy::BodyMesh;
    use crate::params::BodyParams;

    fn body(draft: f32) -> RigidBody {
        let params = BodyParams {
            initial_draft_m: draft,
            initial_yaw_deg: 0.0,
            ..BodyParams::default()
        };
        RigidBody::new(BodyMesh::box_hull(Vec3::new(1.0, 1.0, 1.0)), params, 6.0).unwrap()
    }

    #[test]
    fn test_volume_and_footprint() {
        let body = body(0.5);
        let mut coupler = BuoyancyCoupler::new();
        let volume = coupler.integrate_buoyancy(&body, 6.0);
        // waterline 0.5 above the centre: 1.5 of 2 m submerged
        assert!((volume - 4.0 * 1.5).abs() < 1e-4);

        let hull = coupler.compute_convex_footprint().to_vec();
        assert_eq!(hull.len(), 4);
        for corner in [Vec2::new(1.0, 1.0), Vec2::new(-1.0, -1.0)] {
            assert!(hull.iter().any(|p| (*p - corner).length() < 1e-5));
        }

        let footprint = coupler.publish(&body);
        assert_eq!(footprint.points.len(), 4);
        assert_eq!(footprint.motion.speed, 0.0);
    }

    #[test]
    fn test_dry_body_falls() {
        let mut body = body(-5.0);
        let mut coupler = BuoyancyCoupler::new();
        let volume = coupler.integrate_buoyancy(&body, 6.0);
        assert_eq!(volume, 0.0);
        assert!(coupler.waterline_points().is_empty());

        let y0 = body.position().y;
        coupler.integrate_force(&mut body, volume, 0.03);
        assert!(body.vertical_velocity() < 0.0);
        assert!(body.position().y < y0);
        let (bottom, top) = body.extents();
        assert!((top - bottom - 2.0).abs() < 1e-5);
        assert!((bottom - (body.position().y - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_settles_at_equilibrium() {
        // 1.5 kg needs 1.5 units of displacement: 0.375 m of a 2x2 box
        let mut body = body(0.0);
        let mut coupler = BuoyancyCoupler::new();
        for _ in 0..3000 {
            let volume = coupler.integrate_buoyancy(&body, 6.0);
            coupler.integrate_force(&mut body, volume, 0.03);
        }
        let volume = coupler.integrate_buoyancy(&body, 6.0);
        assert!((volume - body.params().equilibrium_volume()).abs() < 0.01);
        assert!(body.vertical_velocity().abs() < 1e-3);
        let (bottom, _) = body.extents();
        assert!((6.0 - bottom - 0.375).abs() < 0.01);
    }

    #[test]
    fn test_publish_applies_pose() {
        let mut body = body(0.5);
        body.set_controls(1.0, 0.0);
        body.advance_pose(Vec2::ZERO);
        let mut coupler = BuoyancyCoupler::new();
        coupler.integrate_buoyancy(&body, 6.0);
        coupler.compute_convex_footprint();
        let footprint = coupler.publish(&body);

        // yaw 0: moved one unit toward -Z
        let centre = footprint.points.iter().copied().sum::<Vec2>() / 4.0;
        assert!((centre - Vec2::new(0.0, -1.0)).length() < 1e-5);
        assert_eq!(footprint.motion.speed, 1.0);
    }
}
