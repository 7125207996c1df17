//! Triangulated hull mesh and the floating body's pose.

use glam::{Quat, Vec2, Vec3};

use crate::error::{Result, SimError};
use crate::params::BodyParams;
use crate::shallow::BodyMotion;

/// Triangle mesh of a floating hull in body-local coordinates
#[derive(Debug, Clone)]
pub struct BodyMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    min_y: f32,
    max_y: f32,
}

impl BodyMesh {
    /// Build from polygon faces, scaling every vertex by `scale`.
    ///
    /// Faces with more than three vertices are fan-triangulated from their
    /// first vertex.
    pub fn from_polygons(vertices: &[Vec3], faces: &[Vec<u32>], scale: f32) -> Result<Self> {
        let vertices: Vec<Vec3> = vertices.iter().map(|v| *v * scale).collect();
        let mut triangles = Vec::with_capacity(faces.len());

        for (face, indices) in faces.iter().enumerate() {
            if indices.len() < 3 {
                return Err(SimError::DegenerateFace {
                    face,
                    count: indices.len(),
                });
            }
            if let Some(&index) = indices.iter().find(|&&k| k as usize >= vertices.len()) {
                return Err(SimError::VertexIndexOutOfRange {
                    face,
                    index,
                    len: vertices.len(),
                });
            }
            for k in 1..indices.len() - 1 {
                triangles.push([indices[0], indices[k], indices[k + 1]]);
            }
        }

        let (min_y, max_y) = vertices
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v.y), hi.max(v.y)));

        Ok(Self {
            vertices,
            triangles,
            min_y,
            max_y,
        })
    }

    /// Closed axis-aligned box centred on the origin
    pub fn box_hull(half_extents: Vec3) -> Self {
        let h = half_extents;
        let vertices: Vec<Vec3> = (0..8)
            .map(|k| {
                Vec3::new(
                    if k & 1 == 0 { -h.x } else { h.x },
                    if k & 2 == 0 { -h.y } else { h.y },
                    if k & 4 == 0 { -h.z } else { h.z },
                )
            })
            .collect();
        // outward-facing quads
        let faces = [
            [0, 4, 6, 2], // -x
            [1, 3, 7, 5], // +x
            [0, 1, 5, 4], // -y
            [2, 6, 7, 3], // +y
            [0, 2, 3, 1], // -z
            [4, 5, 7, 6], // +z
        ];
        let triangles = faces
            .iter()
            .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
            .collect();

        Self {
            vertices,
            triangles,
            min_y: -h.y,
            max_y: h.y,
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Corner positions of triangle `k`
    pub fn triangle(&self, k: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[k];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Lowest local Y
    pub fn min_y(&self) -> f32 {
        self.min_y
    }

    /// Highest local Y
    pub fn max_y(&self) -> f32 {
        self.max_y
    }
}

/// Floating body: hull mesh, pose and vertical state
#[derive(Debug, Clone)]
pub struct RigidBody {
    mesh: BodyMesh,
    pub(super) params: BodyParams,
    pub(super) position: Vec3,
    yaw_deg: f32,
    /// Forward speed (world units per frame)
    speed: f32,
    /// Yaw change per frame (degrees)
    yaw_rate_deg: f32,
    pub(super) vertical_velocity: f32,
    /// World Y of the hull's lowest point
    pub(super) bottom: f32,
    /// World Y of the hull's highest point
    pub(super) top: f32,
}

impl RigidBody {
    /// Place the hull at the origin, `initial_draft_m` below `rest_height`
    pub fn new(mesh: BodyMesh, params: BodyParams, rest_height: f32) -> Result<Self> {
        params.validate()?;
        let position = Vec3::new(0.0, rest_height - params.initial_draft_m, 0.0);
        Ok(Self {
            bottom: position.y + mesh.min_y(),
            top: position.y + mesh.max_y(),
            yaw_deg: params.initial_yaw_deg,
            mesh,
            params,
            position,
            speed: 0.0,
            yaw_rate_deg: 0.0,
            vertical_velocity: 0.0,
        })
    }

    pub fn mesh(&self) -> &BodyMesh {
        &self.mesh
    }

    pub fn params(&self) -> &BodyParams {
        &self.params
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw_deg(&self) -> f32 {
        self.yaw_deg
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// World-space vertical extent `(bottom, top)`
    pub fn extents(&self) -> (f32, f32) {
        (self.bottom, self.top)
    }

    /// Set forward speed and per-frame yaw change (degrees)
    pub fn set_controls(&mut self, speed: f32, yaw_rate_deg: f32) {
        self.speed = speed;
        self.yaw_rate_deg = yaw_rate_deg;
    }

    pub fn motion(&self) -> BodyMotion {
        BodyMotion {
            speed: self.speed,
            yaw_rate: self.yaw_rate_deg.to_radians(),
        }
    }

    /// Turn, move forward along the heading and drift with the water
    pub fn advance_pose(&mut self, drift: Vec2) {
        self.yaw_deg += self.yaw_rate_deg;
        let (sin, cos) = self.yaw_deg.to_radians().sin_cos();
        self.position.x -= self.speed * sin;
        self.position.z -= self.speed * cos;

        self.position.x += self.params.drift_coupling * drift.x;
        self.position.z += self.params.drift_coupling * drift.y;
    }

    /// Body-local point to world space
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        Quat::from_rotation_y(self.yaw_deg.to_radians()) * local + self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_triangulation() {
        let vertices = [
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::Z,
            Vec3::new(0.5, 1.0, 0.5),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![0, 1, 4]];
        let mesh = BodyMesh::from_polygons(&vertices, &faces, 2.0).unwrap();

        assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3], [0, 1, 4]]);
        assert_eq!(mesh.vertices()[2], Vec3::new(2.0, 0.0, 2.0));
        assert_eq!(mesh.min_y(), 0.0);
        assert_eq!(mesh.max_y(), 2.0);
    }

    #[test]
    fn test_malformed_faces_rejected() {
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Z];
        assert!(matches!(
            BodyMesh::from_polygons(&vertices, &[vec![0, 1]], 1.0),
            Err(SimError::DegenerateFace { face: 0, count: 2 })
        ));
        assert!(matches!(
            BodyMesh::from_polygons(&vertices, &[vec![0, 1, 2], vec![0, 1, 7]], 1.0),
            Err(SimError::VertexIndexOutOfRange {
                face: 1,
                index: 7,
                len: 3
            })
        ));
    }

    #[test]
    fn test_box_hull_is_closed() {
        let mesh = BodyMesh::box_hull(Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(mesh.triangles().len(), 12);
        // every edge is shared by exactly two triangles
        let mut edges = std::collections::HashMap::new();
        for tri in mesh.triangles() {
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        assert!(edges.values().all(|&count| count == 2));
    }

    #[test]
    fn test_advance_pose() {
        let params = BodyParams {
            initial_yaw_deg: 0.0,
            ..BodyParams::default()
        };
        let mut body = RigidBody::new(BodyMesh::box_hull(Vec3::ONE), params, 6.0).unwrap();
        assert!((body.position().y - 4.0).abs() < 1e-6);
        assert_eq!(body.extents(), (3.0, 5.0));

        body.set_controls(0.5, 90.0);
        body.advance_pose(Vec2::new(2.0, 0.0));
        // heading 90°: forward is -X
        assert!((body.yaw_deg() - 90.0).abs() < 1e-6);
        assert!((body.position().x - (-0.5 + 0.1)).abs() < 1e-5);
        assert!(body.position().z.abs() < 1e-5);
        assert!((body.motion().yaw_rate - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_to_world_rotates_about_y() {
        let params = BodyParams {
            initial_yaw_deg: 90.0,
            ..BodyParams::default()
        };
        let body = RigidBody::new(BodyMesh::box_hull(Vec3::ONE), params, 6.0).unwrap();
        let p = body.to_world(Vec3::new(0.0, 0.0, -1.0));
        // local forward (-Z) faces world -X at 90°
        assert!((p - Vec3::new(-1.0, 4.0, 0.0)).length() < 1e-5);
    }
}
