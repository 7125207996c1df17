//! Cell storage, viewpoint recentring and boundary classification.

use glam::{Vec2, Vec3};
use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::footprint::CellList;
use crate::error::Result;
use crate::params::GridParams;
use crate::terrain::Terrain;

/// Classification of a grid cell, re-evaluated every step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    /// Dry land; never advected.
    Ground,
    /// Free water.
    #[default]
    Water,
    /// Water cell against a submerged cliff; reflects instead of flowing.
    Boundary,
    /// Water cell next to a `Boundary` cell.
    NearBoundary,
    /// Covered by a floating body this frame.
    Object,
    /// Water cell next to an `Object` cell this frame.
    ObjectBoundary,
}

impl CellState {
    /// States moved by the advection pass
    pub fn is_advected(self) -> bool {
        matches!(self, CellState::Water | CellState::NearBoundary)
    }

    fn is_transient_object(self) -> bool {
        matches!(self, CellState::Object | CellState::ObjectBoundary)
    }
}

/// One cell of the shallow-water grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// World-space height of the surface point
    pub height: f32,
    /// Depth of water above the local ground (sentinel for dry cells)
    pub water_height: f32,
    pub velocity_x: f32,
    pub velocity_z: f32,
    /// Ground height sampled when the cell was created
    pub ground: f32,
    pub state: CellState,
}

/// Number of cells in each state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub ground: usize,
    pub water: usize,
    pub boundary: usize,
    pub near_boundary: usize,
    pub object: usize,
    pub object_boundary: usize,
}

/// Fixed-size square shallow-water grid following a moving viewpoint
pub struct ShallowWaterGrid {
    pub(super) params: GridParams,
    pub(super) cells: Vec<GridCell>,
    /// Double buffer for advection
    pub(super) scratch: Vec<f32>,
    /// World displacement of the grid origin (x, z)
    pub(super) translate: Vec2,
    pub(super) rng: StdRng,
    pub(super) object_cells: CellList,
    pub(super) object_boundary_cells: CellList,
    pub(super) drift_velocity: Vec2,
}

impl ShallowWaterGrid {
    /// Build the grid around the world origin, sampling `terrain` for every cell
    pub fn new(params: GridParams, terrain: &impl Terrain) -> Result<Self> {
        params.validate()?;
        let n = params.num_cells;

        let mut grid = Self {
            cells: vec![
                GridCell {
                    height: params.rest_height_m,
                    water_height: 0.0,
                    velocity_x: 0.0,
                    velocity_z: 0.0,
                    ground: 0.0,
                    state: CellState::Water,
                };
                n * n
            ],
            scratch: vec![0.0; n * n],
            translate: Vec2::ZERO,
            rng: StdRng::seed_from_u64(params.seed),
            object_cells: CellList::new(params.object_cell_capacity),
            object_boundary_cells: CellList::new(params.object_boundary_capacity),
            drift_velocity: Vec2::ZERO,
            params,
        };
        grid.initialize(terrain);

        let counts = grid.state_counts();
        info!(
            "shallow-water grid {}x{} ({} m): {} water, {} ground, {} boundary",
            n,
            n,
            grid.params.extent_m(),
            counts.water + counts.near_boundary,
            counts.ground,
            counts.boundary
        );
        Ok(grid)
    }

    /// Re-sample every cell from `terrain` at the current translation
    pub fn initialize(&mut self, terrain: &impl Terrain) {
        let n = self.params.num_cells;
        for j in 0..n {
            for i in 0..n {
                self.create_cell(i, j, terrain, false);
            }
        }
        self.classify_boundaries();
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    pub fn num_cells(&self) -> usize {
        self.params.num_cells
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, i: usize, j: usize) -> Option<&GridCell> {
        let n = self.params.num_cells;
        if i < n && j < n {
            self.cells.get(i + j * n)
        } else {
            None
        }
    }

    pub fn rest_height(&self) -> f32 {
        self.params.rest_height_m
    }

    /// Current translation offset `(x, z)` of the grid origin
    pub fn translation(&self) -> Vec2 {
        self.translate
    }

    /// Mean flow velocity under the body, from the last rasterization
    pub fn drift_velocity(&self) -> Vec2 {
        self.drift_velocity
    }

    #[inline]
    pub(super) fn idx(&self, i: usize, j: usize) -> usize {
        i + j * self.params.num_cells
    }

    fn origin(&self) -> f32 {
        -0.5 * self.params.extent_m()
    }

    /// World `(x, z)` of cell `(i, j)`
    pub fn world_position(&self, i: usize, j: usize) -> Vec2 {
        let edge = self.params.cell_edge_m;
        Vec2::new(
            self.origin() + self.translate.x + edge * i as f32,
            self.origin() + self.translate.y + edge * j as f32,
        )
    }

    /// Fractional grid coordinates of world `(x, z)`
    pub fn world_to_grid(&self, x: f32, z: f32) -> Vec2 {
        let edge = self.params.cell_edge_m;
        Vec2::new(
            (x - self.origin() - self.translate.x) / edge,
            (z - self.origin() - self.translate.y) / edge,
        )
    }

    /// Terrain height with negative samples replaced by the flat default
    pub fn sample_ground_height(&self, terrain: &impl Terrain, x: f32, z: f32) -> f32 {
        let height = terrain.ground_height(x, z);
        if height < 0.0 || !height.is_finite() {
            self.params.flat_ground_m
        } else {
            height
        }
    }

    fn create_cell(&mut self, i: usize, j: usize, terrain: &impl Terrain, jitter: bool) {
        let pos = self.world_position(i, j);
        let ground = self.sample_ground_height(terrain, pos.x, pos.y);
        let rest = self.params.rest_height_m;
        let depth = rest - ground;

        let cell = if depth < 0.0 {
            GridCell {
                height: rest,
                water_height: self.params.dry_water_height(),
                velocity_x: 0.0,
                velocity_z: 0.0,
                ground,
                state: CellState::Ground,
            }
        } else {
            let mut raise = 0.0;
            if jitter {
                let roll: f32 = self.rng.gen();
                if roll < self.params.new_cell_jitter_probability {
                    raise = roll;
                }
            }
            GridCell {
                height: rest + raise,
                water_height: depth + raise,
                velocity_x: 0.0,
                velocity_z: 0.0,
                ground,
                state: CellState::Water,
            }
        };

        let index = self.idx(i, j);
        self.cells[index] = cell;
    }

    /// Shift the grid by whole cells so its centre follows `view`.
    ///
    /// Returns the shift applied in cells along X and Z. Boundary
    /// classification runs afterwards in every case.
    pub fn recenter(&mut self, view: Vec3, terrain: &impl Terrain) -> (i32, i32) {
        let mid = self.params.num_cells / 2 - 1;
        let centre = self.world_position(mid, mid);
        let edge = self.params.cell_edge_m;

        let shift_x = whole_cells(view.x - centre.x, edge);
        let shift_z = whole_cells(view.z - centre.y, edge);

        if shift_x != 0 {
            self.shift_columns(shift_x, terrain);
        }
        if shift_z != 0 {
            self.shift_rows(shift_z, terrain);
        }
        if shift_x != 0 || shift_z != 0 {
            debug!(
                "recentred grid by ({shift_x}, {shift_z}) cells, translation now ({:.2}, {:.2})",
                self.translate.x, self.translate.y
            );
        }

        self.classify_boundaries();
        (shift_x, shift_z)
    }

    fn shift_columns(&mut self, shift: i32, terrain: &impl Terrain) {
        let n = self.params.num_cells;
        let steps = (shift.unsigned_abs() as usize).min(n);
        self.translate.x += shift as f32 * self.params.cell_edge_m;

        for j in 0..n {
            let row = &mut self.cells[j * n..(j + 1) * n];
            let fresh = if shift > 0 {
                row.copy_within(steps.., 0);
                n - steps..n
            } else {
                row.copy_within(..n - steps, steps);
                0..steps
            };
            for i in fresh {
                self.create_cell(i, j, terrain, true);
            }
        }
    }

    fn shift_rows(&mut self, shift: i32, terrain: &impl Terrain) {
        let n = self.params.num_cells;
        let steps = (shift.unsigned_abs() as usize).min(n);
        self.translate.y += shift as f32 * self.params.cell_edge_m;

        let fresh = if shift > 0 {
            self.cells.copy_within(steps * n.., 0);
            n - steps..n
        } else {
            self.cells.copy_within(..(n - steps) * n, steps * n);
            0..steps
        };
        for j in fresh {
            for i in 0..n {
                self.create_cell(i, j, terrain, true);
            }
        }
    }

    /// Derive `Boundary` and `NearBoundary` from ground discontinuities.
    ///
    /// Transient object markers are treated as water candidates but keep their
    /// state unless they qualify as a boundary.
    pub fn classify_boundaries(&mut self) {
        let n = self.params.num_cells;
        let threshold = self.params.boundary_threshold_m;

        for cell in &mut self.cells {
            if matches!(cell.state, CellState::Boundary | CellState::NearBoundary) {
                cell.state = CellState::Water;
            }
        }

        for j in 0..n {
            for i in 0..n {
                let index = self.idx(i, j);
                let cell = self.cells[index];
                if !(cell.state == CellState::Water || cell.state.is_transient_object()) {
                    continue;
                }

                // right, left, bottom, top; clamped to the cell itself at the edge
                let neighbours = [
                    self.idx((i + 1).min(n - 1), j),
                    self.idx(i.saturating_sub(1), j),
                    self.idx(i, j.saturating_sub(1)),
                    self.idx(i, (j + 1).min(n - 1)),
                ];
                let cliff = neighbours.iter().any(|&nb| {
                    let other = &self.cells[nb];
                    other.state == CellState::Ground && other.ground - cell.ground > threshold
                });
                if cliff {
                    self.cells[index].state = CellState::Boundary;
                }
            }
        }

        for j in 1..n - 1 {
            for i in 1..n - 1 {
                let index = self.idx(i, j);
                let state = self.cells[index].state;
                if !(state == CellState::Water || state.is_transient_object()) {
                    continue;
                }
                let near = MOORE_OFFSETS.iter().any(|&(di, dj)| {
                    let ni = (i as isize + di) as usize;
                    let nj = (j as isize + dj) as usize;
                    self.cells[self.idx(ni, nj)].state == CellState::Boundary
                });
                if near {
                    self.cells[index].state = CellState::NearBoundary;
                }
            }
        }
    }

    /// Push the surface down at the cell nearest world `(x, z)`.
    ///
    /// Returns false when the point is too close to an edge or lands on dry
    /// ground.
    pub fn add_drop(&mut self, x: f32, z: f32) -> bool {
        let n = self.params.num_cells as i64;
        let margin = self.params.drop_edge_margin_cells as i64;
        let g = self.world_to_grid(x, z);
        if !g.is_finite() {
            return false;
        }
        let i = g.x.round() as i64;
        let j = g.y.round() as i64;

        if i <= margin || i >= n - margin || j <= margin || j >= n - margin {
            return false;
        }
        let index = self.idx(i as usize, j as usize);
        let cell = &mut self.cells[index];
        if cell.state == CellState::Ground {
            return false;
        }
        cell.water_height -= self.params.drop_depth_m;
        true
    }

    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for cell in &self.cells {
            match cell.state {
                CellState::Ground => counts.ground += 1,
                CellState::Water => counts.water += 1,
                CellState::Boundary => counts.boundary += 1,
                CellState::NearBoundary => counts.near_boundary += 1,
                CellState::Object => counts.object += 1,
                CellState::ObjectBoundary => counts.object_boundary += 1,
            }
        }
        counts
    }
}

/// 8-neighbourhood offsets
pub(super) const MOORE_OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Whole cells to shift for a displacement; zero unless it exceeds one cell
fn whole_cells(delta: f32, edge: f32) -> i32 {
    if delta > edge {
        (delta / edge).floor() as i32
    } else if delta < -edge {
        -((-delta / edge).floor() as i32)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;

    fn small_params() -> GridParams {
        GridParams {
            num_cells: 24,
            damping_band_cells: 2,
            new_cell_jitter_probability: 0.0,
            ..GridParams::default()
        }
    }

    /// Deep basin with a tall wall at x >= 6
    fn walled(x: f32, _z: f32) -> f32 {
        if x >= 6.0 {
            20.0
        } else {
            1.0
        }
    }

    #[test]
    fn test_flat_initialization() {
        let grid = ShallowWaterGrid::new(small_params(), &FlatTerrain::new(2.0)).unwrap();
        let counts = grid.state_counts();
        assert_eq!(counts.water, 24 * 24);
        for cell in grid.cells() {
            assert!((cell.water_height - 4.0).abs() < 1e-6);
            assert!((cell.height - 6.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_negative_terrain_uses_flat_default() {
        let grid = ShallowWaterGrid::new(small_params(), &FlatTerrain::new(-10.0)).unwrap();
        assert!((grid.sample_ground_height(&FlatTerrain::new(-10.0), 0.0, 0.0) - 2.0).abs() < 1e-6);
        assert!(grid.cells().iter().all(|c| (c.ground - 2.0).abs() < 1e-6));
    }

    #[test]
    fn test_dry_cells_are_ground() {
        let grid = ShallowWaterGrid::new(small_params(), &FlatTerrain::new(9.0)).unwrap();
        let counts = grid.state_counts();
        assert_eq!(counts.ground, 24 * 24);
        let cell = grid.cell(3, 3).unwrap();
        assert!((cell.water_height - grid.params().dry_water_height()).abs() < 1e-6);
    }

    #[test]
    fn test_world_grid_round_trip() {
        let grid = ShallowWaterGrid::new(small_params(), &FlatTerrain::new(2.0)).unwrap();
        let pos = grid.world_position(5, 17);
        let g = grid.world_to_grid(pos.x, pos.y);
        assert!((g.x - 5.0).abs() < 1e-4);
        assert!((g.y - 17.0).abs() < 1e-4);
    }

    #[test]
    fn test_cliff_classification() {
        let grid = ShallowWaterGrid::new(small_params(), &walled).unwrap();
        let counts = grid.state_counts();
        assert!(counts.ground > 0);
        assert!(counts.boundary > 0);
        assert!(counts.near_boundary > 0);

        for j in 0..24 {
            for i in 0..23 {
                let cell = grid.cell(i, j).unwrap();
                let right = grid.cell(i + 1, j).unwrap();
                if cell.state == CellState::Water && right.state == CellState::Ground {
                    panic!("water cell ({i}, {j}) touches the cliff without being a boundary");
                }
            }
        }
    }

    #[test]
    fn test_small_drop_below_threshold_is_unclassified() {
        // Step of 3 m is under the 6 m threshold
        let terrain = |x: f32, _z: f32| if x >= 6.0 { 7.0 } else { 4.0 };
        let grid = ShallowWaterGrid::new(small_params(), &terrain).unwrap();
        assert_eq!(grid.state_counts().boundary, 0);
    }

    #[test]
    fn test_recenter_below_threshold_is_noop() {
        let terrain = walled;
        let mut grid = ShallowWaterGrid::new(small_params(), &terrain).unwrap();
        let before = grid.cells().to_vec();
        let mid = grid.world_position(11, 11);

        let shift = grid.recenter(Vec3::new(mid.x + 1.4, 0.0, mid.y - 1.0), &terrain);

        assert_eq!(shift, (0, 0));
        assert_eq!(grid.translation(), Vec2::ZERO);
        assert_eq!(grid.cells(), &before[..]);
    }

    #[test]
    fn test_recenter_shifts_contents() {
        let terrain = FlatTerrain::new(2.0);
        let mut grid = ShallowWaterGrid::new(small_params(), &terrain).unwrap();
        let marker = grid.idx(10, 5);
        grid.cells[marker].velocity_x = 3.0;

        let mid = grid.world_position(11, 11);
        // 2.5 cells toward +x → shift of 2
        let shift = grid.recenter(Vec3::new(mid.x + 3.75, 0.0, mid.y), &terrain);

        assert_eq!(shift, (2, 0));
        assert!((grid.translation().x - 3.0).abs() < 1e-6);
        assert!((grid.cell(8, 5).unwrap().velocity_x - 3.0).abs() < 1e-6);
        assert_eq!(grid.cell(23, 5).unwrap().velocity_x, 0.0);
    }

    #[test]
    fn test_recenter_negative_z() {
        let terrain = FlatTerrain::new(2.0);
        let mut grid = ShallowWaterGrid::new(small_params(), &terrain).unwrap();
        let marker = grid.idx(4, 10);
        grid.cells[marker].velocity_z = -1.0;

        let mid = grid.world_position(11, 11);
        let shift = grid.recenter(Vec3::new(mid.x, 0.0, mid.y - 3.1), &terrain);

        assert_eq!(shift, (0, -2));
        assert!((grid.translation().y + 3.0).abs() < 1e-6);
        assert!((grid.cell(4, 12).unwrap().velocity_z + 1.0).abs() < 1e-6);
        assert_eq!(grid.cell(4, 0).unwrap().velocity_z, 0.0);
    }

    #[test]
    fn test_recenter_far_jump_rebuilds() {
        let terrain = FlatTerrain::new(2.0);
        let mut grid = ShallowWaterGrid::new(small_params(), &terrain).unwrap();
        grid.cells[0].velocity_x = 9.0;
        grid.recenter(Vec3::new(1000.0, 0.0, 0.0), &terrain);
        assert!(grid.cells().iter().all(|c| c.velocity_x == 0.0));
    }

    #[test]
    fn test_add_drop() {
        let mut grid = ShallowWaterGrid::new(small_params(), &FlatTerrain::new(2.0)).unwrap();
        let pos = grid.world_position(12, 12);
        assert!(grid.add_drop(pos.x, pos.y));
        assert!((grid.cell(12, 12).unwrap().water_height - 3.5).abs() < 1e-6);

        let edge = grid.world_position(2, 12);
        assert!(!grid.add_drop(edge.x, edge.y));
        assert!(!grid.add_drop(f32::NAN, 0.0));
    }

    #[test]
    fn test_whole_cells() {
        assert_eq!(whole_cells(1.0, 1.5), 0);
        assert_eq!(whole_cells(1.5, 1.5), 0);
        assert_eq!(whole_cells(3.1, 1.5), 2);
        assert_eq!(whole_cells(-4.6, 1.5), -3);
    }
}
