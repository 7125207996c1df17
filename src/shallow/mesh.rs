//! Render-ready surface mesh and horizon skirt for the shallow-water grid.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::grid::{CellState, ShallowWaterGrid};

/// Vertex data for the water surface (position + normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Ring of triangles joining the grid edge to a far square at rest height
#[derive(Debug, Clone, Default)]
pub struct HorizonSkirt {
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// Triangle indices for an `n`×`n` vertex grid (counter-clockwise winding)
pub fn surface_indices(num_cells: usize) -> Vec<u32> {
    let n = num_cells;
    let mut indices = Vec::with_capacity(n.saturating_sub(1).pow(2) * 6);
    for j in 0..n.saturating_sub(1) {
        for i in 0..n - 1 {
            let top_left = (j * n + i) as u32;
            let top_right = top_left + 1;
            let bottom_left = top_left + n as u32;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }
    indices
}

impl ShallowWaterGrid {
    /// Surface vertices, one per cell, in cell order
    pub fn surface_vertices(&self) -> Vec<SurfaceVertex> {
        let mut out = Vec::new();
        self.fill_surface_vertices(&mut out);
        out
    }

    /// Rebuild `out` from the current cell heights.
    ///
    /// Dry cells are dropped to the flat ground level so the terrain hides
    /// them. Normals come from central differences over wet neighbours.
    pub fn fill_surface_vertices(&self, out: &mut Vec<SurfaceVertex>) {
        let n = self.params.num_cells;
        out.clear();
        out.reserve(n * n);

        for j in 0..n {
            for i in 0..n {
                let position = self.surface_point(i, j);

                let left = self.wet_point(i.checked_sub(1), Some(j), position);
                let right = self.wet_point(Some(i + 1), Some(j), position);
                let down = self.wet_point(Some(i), j.checked_sub(1), position);
                let up = self.wet_point(Some(i), Some(j + 1), position);

                let along_x = right - left;
                let along_z = up - down;
                let normal = along_z.cross(along_x).normalize_or(Vec3::Y);

                out.push(SurfaceVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                });
            }
        }
    }

    fn surface_point(&self, i: usize, j: usize) -> Vec3 {
        let cell = &self.cells[self.idx(i, j)];
        let xz = self.world_position(i, j);
        let y = if cell.state == CellState::Ground {
            self.params.flat_ground_m
        } else {
            cell.height
        };
        Vec3::new(xz.x, y, xz.y)
    }

    /// Neighbour surface point, or `fallback` when it is off-grid or dry
    fn wet_point(&self, i: Option<usize>, j: Option<usize>, fallback: Vec3) -> Vec3 {
        let n = self.params.num_cells;
        match (i, j) {
            (Some(i), Some(j)) if i < n && j < n => {
                let cell = &self.cells[self.idx(i, j)];
                if cell.state == CellState::Ground || cell.water_height <= 0.0 {
                    fallback
                } else {
                    self.surface_point(i, j)
                }
            }
            _ => fallback,
        }
    }

    /// Skirt from the grid's outer ring to a square `far_extent_m` from the
    /// grid centre.
    ///
    /// The ring runs along -Z, +X, +Z, then -X; each side fans to the far
    /// corner past its end, and one extra triangle per side closes the gap
    /// between consecutive corners.
    pub fn horizon_skirt(&self, far_extent_m: f32) -> HorizonSkirt {
        let n = self.params.num_cells;
        let rest = self.params.rest_height_m;
        let last = n - 1;

        let sides: [Vec<(usize, usize)>; 4] = [
            (0..n).map(|i| (i, 0)).collect(),
            (0..n).map(|j| (last, j)).collect(),
            (0..n).rev().map(|i| (i, last)).collect(),
            (0..n).rev().map(|j| (0, j)).collect(),
        ];

        let lo = self.world_position(0, 0);
        let hi = self.world_position(last, last);
        let centre = (lo + hi) * 0.5;
        let far = [
            (centre.x + far_extent_m, centre.y - far_extent_m),
            (centre.x + far_extent_m, centre.y + far_extent_m),
            (centre.x - far_extent_m, centre.y + far_extent_m),
            (centre.x - far_extent_m, centre.y - far_extent_m),
        ];

        let mut skirt = HorizonSkirt::default();
        for side in &sides {
            for &(i, j) in side {
                let p = self.world_position(i, j);
                skirt.vertices.push([p.x, rest, p.y]);
            }
        }
        let corner_base = skirt.vertices.len() as u32;
        for (x, z) in far {
            skirt.vertices.push([x, rest, z]);
        }

        let n32 = n as u32;
        for s in 0..4u32 {
            let start = s * n32;
            let corner = corner_base + s;
            for k in 0..n32 - 1 {
                skirt.indices.extend_from_slice(&[start + k, start + k + 1, corner]);
            }
            let next_corner = corner_base + (s + 1) % 4;
            skirt
                .indices
                .extend_from_slice(&[start + n32 - 1, corner, next_corner]);
        }
        skirt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GridParams;
    use crate::terrain::FlatTerrain;

    fn grid(terrain: &impl crate::terrain::Terrain) -> ShallowWaterGrid {
        let params = GridParams {
            num_cells: 12,
            damping_band_cells: 1,
            ..GridParams::default()
        };
        ShallowWaterGrid::new(params, terrain).unwrap()
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<SurfaceVertex>(), 24);
        let grid = grid(&FlatTerrain::new(2.0));
        let vertices = grid.surface_vertices();
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 12 * 12 * 24);
    }

    #[test]
    fn test_flat_surface_normals_point_up() {
        let grid = grid(&FlatTerrain::new(2.0));
        for v in grid.surface_vertices() {
            assert!((v.position[1] - 6.0).abs() < 1e-6);
            assert!((v.normal[1] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ground_cells_lowered() {
        let terrain = |x: f32, _z: f32| if x > 0.0 { 8.0 } else { 2.0 };
        let grid = grid(&terrain);
        let vertices = grid.surface_vertices();
        let dry = &vertices[11];
        assert!((dry.position[1] - 2.0).abs() < 1e-6);
        let wet = &vertices[0];
        assert!((wet.position[1] - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_surface_indices() {
        let indices = surface_indices(3);
        assert_eq!(indices.len(), 2 * 2 * 6);
        assert_eq!(&indices[..6], &[0, 3, 1, 1, 3, 4]);
        assert_eq!(*indices.iter().max().unwrap(), 8);
    }

    #[test]
    fn test_horizon_skirt_topology() {
        let grid = grid(&FlatTerrain::new(2.0));
        let skirt = grid.horizon_skirt(500.0);
        assert_eq!(skirt.vertices.len(), 4 * 12 + 4);
        assert_eq!(skirt.indices.len(), 4 * 12 * 3);
        assert!(skirt
            .indices
            .iter()
            .all(|&k| (k as usize) < skirt.vertices.len()));
        assert!(skirt.vertices.iter().all(|v| v[1] == 6.0));
    }
}
