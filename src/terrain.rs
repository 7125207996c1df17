//! Ground height sources for the shallow-water grid.
//!
//! The grid never owns terrain; it is handed a `&impl Terrain` whenever new
//! cells need a ground sample.

use noise::{NoiseFn, OpenSimplex};

/// Ground height query in world space
pub trait Terrain {
    /// Ground height at world position `(x, z)`. Negative values mean
    /// "no meaningful ground here".
    fn ground_height(&self, x: f32, z: f32) -> f32;
}

impl<F> Terrain for F
where
    F: Fn(f32, f32) -> f32,
{
    fn ground_height(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Constant-height sea floor
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain {
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Terrain for FlatTerrain {
    fn ground_height(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }
}

/// Procedural shoreline built from OpenSimplex noise
pub struct NoiseTerrain {
    simplex: OpenSimplex,
    /// Mean ground height (meters)
    pub base_m: f32,
    /// Peak deviation from the mean (meters)
    pub amplitude_m: f32,
    /// Spatial frequency (cycles per meter)
    pub frequency: f32,
}

impl NoiseTerrain {
    /// Create new noise terrain with seed
    pub fn new(seed: u32, base_m: f32, amplitude_m: f32, frequency: f32) -> Self {
        Self {
            simplex: OpenSimplex::new(seed),
            base_m,
            amplitude_m,
            frequency,
        }
    }
}

impl Terrain for NoiseTerrain {
    fn ground_height(&self, x: f32, z: f32) -> f32 {
        let n = self
            .simplex
            .get([(x * self.frequency) as f64, (z * self.frequency) as f64]) as f32;
        self.base_m + n * self.amplitude_m
    }
}

/// Regularly sampled height grid with bilinear lookup
#[derive(Debug, Clone)]
pub struct HeightmapTerrain {
    width: usize,
    depth: usize,
    cell_size: f32,
    origin_x: f32,
    origin_z: f32,
    heights: Vec<f32>,
}

impl HeightmapTerrain {
    /// Height returned for queries outside the sampled area
    pub const OUTSIDE: f32 = -1.0;

    /// `heights` is row-major, `width` samples per row.
    pub fn new(
        width: usize,
        depth: usize,
        cell_size: f32,
        origin: (f32, f32),
        heights: Vec<f32>,
    ) -> Option<Self> {
        if width < 2 || depth < 2 || heights.len() != width * depth || cell_size <= 0.0 {
            return None;
        }
        Some(Self {
            width,
            depth,
            cell_size,
            origin_x: origin.0,
            origin_z: origin.1,
            heights,
        })
    }

    fn sample(&self, x: usize, z: usize) -> f32 {
        self.heights[z * self.width + x]
    }
}

impl Terrain for HeightmapTerrain {
    fn ground_height(&self, x: f32, z: f32) -> f32 {
        let fx = (x - self.origin_x) / self.cell_size;
        let fz = (z - self.origin_z) / self.cell_size;

        if !(fx >= 0.0 && fz >= 0.0) {
            return Self::OUTSIDE;
        }
        let max_x = (self.width - 1) as f32;
        let max_z = (self.depth - 1) as f32;
        if fx > max_x || fz > max_z {
            return Self::OUTSIDE;
        }

        let x0 = (fx as usize).min(self.width - 2);
        let z0 = (fz as usize).min(self.depth - 2);
        let s = fx - x0 as f32;
        let t = fz - z0 as f32;

        let h00 = self.sample(x0, z0);
        let h10 = self.sample(x0 + 1, z0);
        let h01 = self.sample(x0, z0 + 1);
        let h11 = self.sample(x0 + 1, z0 + 1);

        (1.0 - s) * ((1.0 - t) * h00 + t * h01) + s * ((1.0 - t) * h10 + t * h11)
    }
}
