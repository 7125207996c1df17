//! Body footprint rasterization and wake displacement.

use glam::Vec2;
use log::warn;

use super::grid::{CellState, ShallowWaterGrid, MOORE_OFFSETS};

/// Capacity-limited list of cell indices.
///
/// Pushes past capacity are dropped and counted instead of growing the list.
#[derive(Debug, Clone)]
pub struct CellList {
    indices: Vec<usize>,
    capacity: usize,
    dropped: usize,
}

impl CellList {
    pub fn new(capacity: usize) -> Self {
        Self {
            indices: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.dropped = 0;
    }

    /// Returns false if the list is full and the index was dropped
    pub fn push(&mut self, index: usize) -> bool {
        if self.indices.len() < self.capacity {
            self.indices.push(index);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Horizontal motion of a floating body for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyMotion {
    /// Forward speed (world units per frame)
    pub speed: f32,
    /// Yaw change per frame (radians)
    pub yaw_rate: f32,
}

impl BodyMotion {
    pub fn is_moving(&self, epsilon: f32) -> bool {
        self.speed.abs() > epsilon || self.yaw_rate.abs() > epsilon
    }
}

/// Convex waterline polygon in world `(x, z)` plus the body's motion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Footprint {
    pub points: Vec<Vec2>,
    pub motion: BodyMotion,
}

/// What one rasterization pass marked
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RasterStats {
    pub object_cells: usize,
    pub object_boundary_cells: usize,
    /// Cells marked but not tracked because a list was full
    pub dropped_cells: usize,
    /// Wake transfers applied
    pub wake_transfers: usize,
    pub drift_velocity: Vec2,
}

/// Inclusive bounding box in cell indices
#[derive(Debug, Clone, Copy)]
struct CellRect {
    i0: usize,
    i1: usize,
    j0: usize,
    j1: usize,
}

impl ShallowWaterGrid {
    /// Mark the cells covered by `footprint` as `Object`, their water
    /// neighbours as `ObjectBoundary`, and push a wake out of the hull when
    /// the body moves.
    ///
    /// Footprints with fewer than three points, non-finite coordinates or no
    /// area mark nothing.
    pub fn rasterize_footprint(&mut self, footprint: &Footprint) -> RasterStats {
        self.object_cells.clear();
        self.object_boundary_cells.clear();
        self.drift_velocity = Vec2::ZERO;

        let points = &footprint.points;
        if points.len() < 3 || points.iter().any(|p| !p.is_finite()) {
            return RasterStats::default();
        }

        let polygon: Vec<Vec2> = points
            .iter()
            .map(|p| self.world_to_grid(p.x, p.y))
            .collect();

        let area2 = signed_area2(&polygon);
        if area2.abs() <= f32::EPSILON {
            return RasterStats::default();
        }
        let orientation = area2.signum();

        let rect = self.clamped_rect(&polygon);
        let n = self.params.num_cells;

        let mut marked = 0usize;
        let mut velocity_sum = Vec2::ZERO;
        for j in rect.j0..=rect.j1 {
            for i in rect.i0..=rect.i1 {
                let p = Vec2::new(i as f32, j as f32);
                if !inside_convex(&polygon, orientation, p) {
                    continue;
                }
                let index = i + j * n;
                let cell = &mut self.cells[index];
                if cell.state != CellState::Water {
                    continue;
                }
                cell.state = CellState::Object;
                velocity_sum += Vec2::new(cell.velocity_x, cell.velocity_z);
                marked += 1;
                self.object_cells.push(index);
            }
        }
        if marked > 0 {
            self.drift_velocity = velocity_sum / marked as f32;
        }

        let boundary = self.mark_object_boundary(rect);

        let wake_transfers = if footprint.motion.is_moving(self.params.motion_epsilon) {
            self.displace_wake()
        } else {
            0
        };

        let dropped = self.object_cells.dropped() + self.object_boundary_cells.dropped();
        if dropped > 0 {
            warn!(
                "footprint marked more cells than tracked: {} object, {} boundary dropped",
                self.object_cells.dropped(),
                self.object_boundary_cells.dropped()
            );
        }

        RasterStats {
            object_cells: marked,
            object_boundary_cells: boundary,
            dropped_cells: dropped,
            wake_transfers,
            drift_velocity: self.drift_velocity,
        }
    }

    /// Tracked object cells from the last rasterization
    pub fn object_cell_indices(&self) -> &[usize] {
        self.object_cells.as_slice()
    }

    /// Polygon bounding box, clamped to interior cells
    fn clamped_rect(&self, polygon: &[Vec2]) -> CellRect {
        let hi = (self.params.num_cells - 2) as f32;
        let (min, max) = polygon
            .iter()
            .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, up), p| {
                (lo.min(*p), up.max(*p))
            });
        CellRect {
            i0: min.x.floor().clamp(1.0, hi) as usize,
            i1: max.x.ceil().clamp(1.0, hi) as usize,
            j0: min.y.floor().clamp(1.0, hi) as usize,
            j1: max.y.ceil().clamp(1.0, hi) as usize,
        }
    }

    fn mark_object_boundary(&mut self, rect: CellRect) -> usize {
        let n = self.params.num_cells;
        let grown = CellRect {
            i0: rect.i0.saturating_sub(1).max(1),
            i1: (rect.i1 + 1).min(n - 2),
            j0: rect.j0.saturating_sub(1).max(1),
            j1: (rect.j1 + 1).min(n - 2),
        };

        let mut marked = 0;
        for j in grown.j0..=grown.j1 {
            for i in grown.i0..=grown.i1 {
                let index = i + j * n;
                if self.cells[index].state != CellState::Water {
                    continue;
                }
                let touches = MOORE_OFFSETS.iter().any(|&(di, dj)| {
                    let ni = (i as isize + di) as usize;
                    let nj = (j as isize + dj) as usize;
                    self.cells[ni + nj * n].state == CellState::Object
                });
                if touches {
                    self.cells[index].state = CellState::ObjectBoundary;
                    marked += 1;
                    self.object_boundary_cells.push(index);
                }
            }
        }
        marked
    }

    /// Move a quarter of the displaced height from each raised object cell to
    /// the nearest object-boundary cell along the axes.
    fn displace_wake(&mut self) -> usize {
        let n = self.params.num_cells;
        let rest = self.params.rest_height_m;
        let displaced = self.params.displaced_height_m;
        let transfer = displaced / 4.0;
        let radius = self.params.wake_search_radius_cells;

        let mut transfers = 0;
        for k in 0..self.object_cells.len() {
            let index = self.object_cells.as_slice()[k];
            let cell = self.cells[index];
            if cell.water_height <= rest - cell.ground - displaced {
                continue;
            }
            let x = index % n;
            let z = index / n;

            'search: for offset in 1..=radius {
                // +x, -x, +z, -z
                let candidates = [
                    (x + offset < n).then(|| index + offset),
                    (x >= offset + 1).then(|| index - offset),
                    (z + offset < n).then(|| index + offset * n),
                    (z >= offset + 1).then(|| index - offset * n),
                ];
                for target in candidates.into_iter().flatten() {
                    if self.cells[target].state == CellState::ObjectBoundary {
                        self.cells[index].water_height -= transfer;
                        self.cells[target].water_height += transfer;
                        transfers += 1;
                        break 'search;
                    }
                }
            }
        }
        transfers
    }
}

/// Twice the signed area of a polygon
fn signed_area2(polygon: &[Vec2]) -> f32 {
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum()
}

/// Edge-function test; points on an edge count as inside
fn inside_convex(polygon: &[Vec2], orientation: f32, p: Vec2) -> bool {
    const TOLERANCE: f32 = 1e-5;
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .all(|(a, b)| (*b - *a).perp_dot(p - *a) * orientation >= -TOLERANCE)
}
