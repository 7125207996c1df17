//! Submerged volume by triangle/water-plane clipping.
//!
//! Each hull triangle contributes the signed tetrahedron it forms with an
//! apex on the water plane. Triangles crossing the plane are cut to their
//! submerged part first, keeping the triangle's winding; the cut points are
//! the hull's waterline. Over a closed hull the waterline cap lies in the
//! apex plane and adds nothing, so the signed sum is exact for any shape.

use glam::Vec3;

use super::body::BodyMesh;

/// Signed volume of the tetrahedron `(a, b, c, apex)`; positive when
/// `a, b, c` wind counter-clockwise seen from the side away from `apex`
pub fn signed_tetrahedron_volume(a: Vec3, b: Vec3, c: Vec3, apex: Vec3) -> f32 {
    (a - apex).dot((b - apex).cross(c - apex)) / 6.0
}

/// Unsigned volume of the tetrahedron `(a, b, c, apex)`
pub fn tetrahedron_volume(a: Vec3, b: Vec3, c: Vec3, apex: Vec3) -> f32 {
    signed_tetrahedron_volume(a, b, c, apex).abs()
}

/// Point where edge `a → b` meets the water plane, from signed depths
#[inline]
fn cut(a: Vec3, depth_a: f32, b: Vec3, depth_b: f32) -> Vec3 {
    a + (b - a) * (depth_a / (depth_a - depth_b))
}

/// `a` submerged, `b` and `c` dry: the corner triangle `(a, ab, ac)`
fn clip_one(
    [a, b, c]: [Vec3; 3],
    [da, db, dc]: [f32; 3],
    apex: Vec3,
) -> (f32, Vec3, Vec3) {
    let ab = cut(a, da, b, db);
    let ac = cut(a, da, c, dc);
    (signed_tetrahedron_volume(a, ab, ac, apex), ab, ac)
}

/// `a` dry, `b` and `c` submerged: the quad `(b, c, ca, ab)` as two triangles
fn clip_two(
    [a, b, c]: [Vec3; 3],
    [da, db, dc]: [f32; 3],
    apex: Vec3,
) -> (f32, Vec3, Vec3) {
    let ab = cut(b, db, a, da);
    let ca = cut(c, dc, a, da);
    let volume =
        signed_tetrahedron_volume(b, c, ca, apex) + signed_tetrahedron_volume(b, ca, ab, apex);
    (volume, ca, ab)
}

/// Signed submerged volume of one triangle under the plane.
///
/// `depth` holds each corner's signed height above the water; negative
/// means submerged and zero counts as dry. The sign follows the triangle's
/// winding; sum over a closed mesh and take the magnitude. Cut points are
/// appended to `waterline` in pairs.
pub fn clip_triangle(tri: [Vec3; 3], depth: [f32; 3], apex: Vec3, waterline: &mut Vec<Vec3>) -> f32 {
    let [v0, v1, v2] = tri;
    let [d0, d1, d2] = depth;

    let (volume, clipped) = match (d0 < 0.0, d1 < 0.0, d2 < 0.0) {
        (true, true, true) => (signed_tetrahedron_volume(v0, v1, v2, apex), None),
        (false, false, false) => (0.0, None),

        (true, false, false) => split(clip_one([v0, v1, v2], [d0, d1, d2], apex)),
        (false, true, false) => split(clip_one([v1, v2, v0], [d1, d2, d0], apex)),
        (false, false, true) => split(clip_one([v2, v0, v1], [d2, d0, d1], apex)),

        (false, true, true) => split(clip_two([v0, v1, v2], [d0, d1, d2], apex)),
        (true, false, true) => split(clip_two([v1, v2, v0], [d1, d2, d0], apex)),
        (true, true, false) => split(clip_two([v2, v0, v1], [d2, d0, d1], apex)),
    };

    if let Some((c1, c2)) = clipped {
        waterline.push(c1);
        waterline.push(c2);
    }
    volume
}

#[inline]
fn split((volume, c1, c2): (f32, Vec3, Vec3)) -> (f32, Option<(Vec3, Vec3)>) {
    (volume, Some((c1, c2)))
}

/// Submerged volume of `mesh` with its origin `height_above_water` above the
/// plane, in body-local coordinates.
///
/// The apex sits on the body's vertical axis at the water plane. The mesh
/// must be closed with consistent winding; either winding direction works.
pub fn submerged_volume(mesh: &BodyMesh, height_above_water: f32, waterline: &mut Vec<Vec3>) -> f32 {
    waterline.clear();
    let plane_y = -height_above_water;
    let apex = Vec3::new(0.0, plane_y, 0.0);

    let signed: f32 = (0..mesh.triangles().len())
        .map(|k| {
            let tri = mesh.triangle(k);
            let depth = tri.map(|v| v.y - plane_y);
            clip_triangle(tri, depth, apex, waterline)
        })
        .sum();
    signed.abs()
}
