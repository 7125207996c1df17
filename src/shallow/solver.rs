//! Semi-Lagrangian shallow-water integration.
//!
//! One step runs, in order:
//! 1. clear last frame's object markers
//! 2. advect water height, then X velocity, then Z velocity
//! 3. integrate height from velocity divergence
//! 4. integrate velocity from the height gradient
//! 5. reflect at cliff boundaries
//! 6. absorb toward rest in the edge band
//!
//! Cells are indexed `i + j * n`; velocities are sampled at cell faces, so
//! the stencils read `i + 1` and `i + n` as the far faces.

use log::warn;

use super::grid::{CellState, GridCell, ShallowWaterGrid};

/// Field moved by an advection pass
#[derive(Debug, Clone, Copy)]
enum Quantity {
    WaterHeight,
    VelocityX,
    VelocityZ,
}

impl Quantity {
    #[inline]
    fn get(self, cell: &GridCell) -> f32 {
        match self {
            Quantity::WaterHeight => cell.water_height,
            Quantity::VelocityX => cell.velocity_x,
            Quantity::VelocityZ => cell.velocity_z,
        }
    }

    #[inline]
    fn set(self, cell: &mut GridCell, value: f32) {
        match self {
            Quantity::WaterHeight => cell.water_height = value,
            Quantity::VelocityX => cell.velocity_x = value,
            Quantity::VelocityZ => cell.velocity_z = value,
        }
    }
}

/// Axis a reflecting neighbour lies along
#[derive(Debug, Clone, Copy)]
enum Reflect {
    X,
    Z,
    Diagonal,
}

/// Search order for a reflecting cell's `NearBoundary` neighbour
const REFLECT_ORDER: [(isize, isize, Reflect); 8] = [
    (1, 0, Reflect::X),
    (-1, 0, Reflect::X),
    (0, 1, Reflect::Z),
    (0, -1, Reflect::Z),
    (-1, -1, Reflect::Diagonal),
    (1, -1, Reflect::Diagonal),
    (-1, 1, Reflect::Diagonal),
    (1, 1, Reflect::Diagonal),
];

impl ShallowWaterGrid {
    /// Advance the grid by `dt` seconds.
    ///
    /// Returns the number of non-finite values replaced during the step.
    pub fn step(&mut self, dt: f32) -> usize {
        self.reset_object_cells();

        self.advect(Quantity::WaterHeight, dt);
        self.advect(Quantity::VelocityX, dt);
        self.advect(Quantity::VelocityZ, dt);
        let mut repaired = self.sanitize();

        self.integrate_height(dt);
        self.integrate_velocity(dt);
        self.reflect_boundaries();
        self.absorb_boundaries();
        repaired += self.sanitize();

        if repaired > 0 {
            warn!("shallow-water step replaced {repaired} non-finite values");
        }
        repaired
    }

    fn reset_object_cells(&mut self) {
        for cell in &mut self.cells {
            if matches!(cell.state, CellState::Object | CellState::ObjectBoundary) {
                cell.state = CellState::Water;
            }
        }
    }

    /// Velocity carrying `quantity` at interior cell `index`
    fn carrier_velocity(&self, quantity: Quantity, index: usize) -> (f32, f32) {
        let n = self.params.num_cells;
        let c = &self.cells;
        match quantity {
            Quantity::WaterHeight => (
                0.5 * (c[index].velocity_x + c[index + 1].velocity_x),
                0.5 * (c[index].velocity_z + c[index + n].velocity_z),
            ),
            Quantity::VelocityX => (
                c[index].velocity_x,
                0.25 * (c[index].velocity_z
                    + c[index + 1].velocity_z
                    + c[index + n].velocity_z
                    + c[index + n + 1].velocity_z),
            ),
            Quantity::VelocityZ => (
                0.25 * (c[index].velocity_x
                    + c[index + 1].velocity_x
                    + c[index + n].velocity_x
                    + c[index + n + 1].velocity_x),
                c[index].velocity_z,
            ),
        }
    }

    /// Bilinear sample of `quantity` at fractional cell coordinates
    fn sample_bilinear(&self, quantity: Quantity, x: f32, z: f32) -> f32 {
        let n = self.params.num_cells;
        let x0 = (x as usize).min(n - 2);
        let z0 = (z as usize).min(n - 2);
        let s = x - x0 as f32;
        let t = z - z0 as f32;

        let at = |i: usize, j: usize| quantity.get(&self.cells[i + j * n]);
        let a00 = at(x0, z0);
        let a10 = at(x0 + 1, z0);
        let a01 = at(x0, z0 + 1);
        let a11 = at(x0 + 1, z0 + 1);

        (1.0 - s) * ((1.0 - t) * a00 + t * a01) + s * ((1.0 - t) * a10 + t * a11)
    }

    fn advect(&mut self, quantity: Quantity, dt: f32) {
        let n = self.params.num_cells;
        let scale = dt / self.params.cell_edge_m;
        let max = (n - 1) as f32;

        for j in 1..n - 1 {
            for i in 1..n - 1 {
                let index = self.idx(i, j);
                if !self.cells[index].state.is_advected() {
                    continue;
                }
                let (u, v) = self.carrier_velocity(quantity, index);
                let mut src_x = i as f32 - u * scale;
                let mut src_z = j as f32 - v * scale;
                if !src_x.is_finite() {
                    src_x = i as f32;
                }
                if !src_z.is_finite() {
                    src_z = j as f32;
                }
                self.scratch[index] =
                    self.sample_bilinear(quantity, src_x.clamp(0.0, max), src_z.clamp(0.0, max));
            }
        }

        for j in 1..n - 1 {
            for i in 1..n - 1 {
                let index = self.idx(i, j);
                if self.cells[index].state.is_advected() {
                    quantity.set(&mut self.cells[index], self.scratch[index]);
                }
            }
        }
    }

    fn integrate_height(&mut self, dt: f32) {
        let n = self.params.num_cells;
        let inv_edge = 1.0 / self.params.cell_edge_m;

        for j in 1..n - 1 {
            for i in 1..n - 1 {
                let index = self.idx(i, j);
                if !self.cells[index].state.is_advected() {
                    continue;
                }
                let divergence = (self.cells[index + 1].velocity_x
                    - self.cells[index].velocity_x)
                    + (self.cells[index + n].velocity_z - self.cells[index].velocity_z);
                let cell = &mut self.cells[index];
                let dh = -0.5 * cell.water_height * inv_edge * divergence;
                cell.water_height += dh * dt;
                cell.height = cell.ground + cell.water_height;
            }
        }

        let rest = self.params.rest_height_m;
        for k in 0..n {
            for index in [self.idx(k, 0), self.idx(k, n - 1), self.idx(0, k), self.idx(n - 1, k)] {
                self.cells[index].height = rest;
            }
        }
    }

    fn integrate_velocity(&mut self, dt: f32) {
        let n = self.params.num_cells;
        let factor = -self.params.gravity_m_per_s2 * dt / self.params.cell_edge_m;

        for j in 1..n - 1 {
            for i in 1..n - 1 {
                let index = self.idx(i, j);
                if !self.cells[index].state.is_advected() {
                    continue;
                }
                let h = self.cells[index].height;
                let dx = h - self.cells[index - 1].height;
                let dz = h - self.cells[index - n].height;
                let cell = &mut self.cells[index];
                cell.velocity_x += factor * dx;
                cell.velocity_z += factor * dz;
            }
        }
    }

    /// Copy the first `NearBoundary` neighbour into each reflecting cell
    fn reflect_boundaries(&mut self) {
        let n = self.params.num_cells as isize;
        let rest = self.params.rest_height_m;

        for j in 0..n {
            for i in 0..n {
                let index = (i + j * n) as usize;
                if self.cells[index].state != CellState::Boundary {
                    continue;
                }

                let neighbour = REFLECT_ORDER.iter().find_map(|&(di, dj, axis)| {
                    let (ni, nj) = (i + di, j + dj);
                    if ni < 0 || nj < 0 || ni >= n || nj >= n {
                        return None;
                    }
                    let other = &self.cells[(ni + nj * n) as usize];
                    (other.state == CellState::NearBoundary).then_some((other.height, axis))
                });

                let cell = &mut self.cells[index];
                match neighbour {
                    Some((height, axis)) => {
                        cell.height = height;
                        match axis {
                            Reflect::X => cell.velocity_x = 0.0,
                            Reflect::Z => cell.velocity_z = 0.0,
                            Reflect::Diagonal => {
                                cell.velocity_x = 0.0;
                                cell.velocity_z = 0.0;
                            }
                        }
                    }
                    None => cell.height = rest,
                }
            }
        }
    }

    /// Blend toward rest inside the damping band along every edge
    fn absorb_boundaries(&mut self) {
        let n = self.params.num_cells;
        let band = self.params.damping_band_cells;
        let rest = self.params.rest_height_m;

        for j in 0..n {
            for i in 0..n {
                let edge_distance = i.min(j).min(n - 1 - i).min(n - 1 - j);
                if edge_distance > band {
                    continue;
                }
                let index = self.idx(i, j);
                let cell = &mut self.cells[index];
                if cell.state == CellState::Ground {
                    continue;
                }
                let factor = (band + 1 - edge_distance) as f32 / (band + 1) as f32;
                let keep = 1.0 - factor;
                cell.height = cell.height * keep + rest * factor;
                cell.velocity_x *= keep;
                cell.velocity_z *= keep;
            }
        }
    }

    /// Replace non-finite values with rest state; returns how many were fixed
    fn sanitize(&mut self) -> usize {
        let rest = self.params.rest_height_m;
        let mut repaired = 0;
        for cell in &mut self.cells {
            if !cell.height.is_finite() {
                cell.height = rest;
                repaired += 1;
            }
            if !cell.water_height.is_finite() {
                cell.water_height = (rest - cell.ground).max(0.0);
                repaired += 1;
            }
            if !cell.velocity_x.is_finite() {
                cell.velocity_x = 0.0;
                repaired += 1;
            }
            if !cell.velocity_z.is_finite() {
                cell.velocity_z = 0.0;
                repaired += 1;
            }
        }
        repaired
    }
}
