//! Phillips-spectrum amplitudes and their evolution through an inverse FFT.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec2;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use rustfft::{num_complex::Complex32, Fft, FftPlanner};

use crate::error::Result;
use crate::params::SpectrumParams;

/// Toroidal deep-water height field synthesized from a wave spectrum.
///
/// Texel `(i, j)` lives at index `i * N + j`; `i` runs along X and `j`
/// along Z.
pub struct SpectralWaveField {
    pub(super) params: SpectrumParams,
    /// Amplitudes for `+k`
    amp_positive: Vec<Complex32>,
    /// Amplitudes for `-k`
    amp_negative: Vec<Complex32>,
    /// Dispersion frequency per wavevector
    omega: Vec<f32>,
    working: Vec<Complex32>,
    transposed: Vec<Complex32>,
    fft_scratch: Vec<Complex32>,
    fft: Arc<dyn Fft<f32>>,
    pub(super) heights: Vec<f32>,
    spectral_time: f32,
}

impl SpectralWaveField {
    /// Plan the transform and draw the initial amplitudes
    pub fn new(params: SpectrumParams) -> Result<Self> {
        params.validate()?;
        let n = params.grid_size;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_inverse(n);
        let fft_scratch = vec![Complex32::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let mut field = Self {
            amp_positive: vec![Complex32::new(0.0, 0.0); n * n],
            amp_negative: vec![Complex32::new(0.0, 0.0); n * n],
            omega: vec![0.0; n * n],
            working: vec![Complex32::new(0.0, 0.0); n * n],
            transposed: vec![Complex32::new(0.0, 0.0); n * n],
            fft_scratch,
            fft,
            heights: vec![0.0; n * n],
            spectral_time: 0.0,
            params,
        };
        let wind = field.params.wind_direction;
        field.initialize(wind);

        info!(
            "spectral field {}x{} over {} m, wind {:.1} m/s",
            n, n, field.params.domain_length_m, field.params.wind_speed_m_per_s
        );
        Ok(field)
    }

    /// Redraw every amplitude pair for a new wind direction.
    ///
    /// Draws restart from the configured seed, so the same direction always
    /// yields the same field.
    pub fn initialize(&mut self, wind_direction: Vec2) {
        let n = self.params.grid_size;
        self.params.wind_direction = wind_direction.normalize_or(Vec2::X);
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        for i in 0..n {
            for j in 0..n {
                let index = i * n + j;
                let k = self.wavevector(i, j);

                let positive = gaussian_pair(&mut rng);
                let negative = gaussian_pair(&mut rng);
                self.amp_positive[index] = positive * (self.phillips(k) / 2.0).sqrt();
                self.amp_negative[index] = negative * (self.phillips(-k) / 2.0).sqrt();
                self.omega[index] = (self.params.gravity_m_per_s2 * k.length()).sqrt();
            }
        }
    }

    /// Wavevector of texel `(i, j)` on the centred grid
    pub fn wavevector(&self, i: usize, j: usize) -> Vec2 {
        let n = self.params.grid_size as f32;
        let scale = 2.0 * PI / self.params.domain_length_m;
        Vec2::new(
            scale * (i as f32 - n / 2.0),
            scale * (j as f32 - n / 2.0),
        )
    }

    /// Phillips spectrum `A·exp(-g²/(k²V⁴))/k⁵·(k̂·ŵ)²`, zero at `k = 0`
    pub fn phillips(&self, k: Vec2) -> f32 {
        let k_len2 = k.length_squared();
        if k_len2 <= f32::EPSILON * f32::EPSILON {
            return 0.0;
        }
        let k_len = k_len2.sqrt();
        let g = self.params.gravity_m_per_s2;
        let v2 = self.params.wind_speed_m_per_s * self.params.wind_speed_m_per_s;
        let alignment = (k / k_len).dot(self.params.wind_direction);

        self.params.amplitude * (-(g * g) / (k_len2 * v2 * v2)).exp() / k_len.powi(5)
            * alignment
            * alignment
    }

    /// Evaluate the field at `elapsed_s` seconds since start.
    ///
    /// Depends only on the elapsed time, never on earlier calls.
    pub fn step(&mut self, elapsed_s: f32) {
        let n = self.params.grid_size;
        let t = elapsed_s * self.params.time_scale;
        self.spectral_time = t;

        for (index, value) in self.working.iter_mut().enumerate() {
            let (sin, cos) = (self.omega[index] * t).sin_cos();
            let p = self.amp_positive[index];
            let m = self.amp_negative[index];
            *value = Complex32::new(
                (p.re + m.re) * cos - (p.im + m.im) * sin,
                (p.im - m.im) * cos + (p.re - m.re) * sin,
            );
        }

        // rows, then columns through a transposed copy
        self.fft
            .process_with_scratch(&mut self.working, &mut self.fft_scratch);
        for i in 0..n {
            for j in 0..n {
                self.transposed[j * n + i] = self.working[i * n + j];
            }
        }
        self.fft
            .process_with_scratch(&mut self.transposed, &mut self.fft_scratch);

        // undo the centring shift of the wavevector grid
        for i in 0..n {
            for j in 0..n {
                let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
                self.heights[i * n + j] = sign * self.transposed[j * n + i].re;
            }
        }
    }

    /// Real height field from the last `step`
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn grid_size(&self) -> usize {
        self.params.grid_size
    }

    pub fn params(&self) -> &SpectrumParams {
        &self.params
    }

    /// Time value used by the last `step`
    pub fn spectral_time(&self) -> f32 {
        self.spectral_time
    }
}

fn gaussian_pair(rng: &mut StdRng) -> Complex32 {
    Complex32::new(rng.sample(StandardNormal), rng.sample(StandardNormal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64) -> SpectralWaveField {
        SpectralWaveField::new(SpectrumParams {
            grid_size: 16,
            seed,
            ..SpectrumParams::default()
        })
        .unwrap()
    }

    #[test]
    fn test_phillips_shape() {
        let field = small(1);
        assert_eq!(field.phillips(Vec2::ZERO), 0.0);
        // perpendicular to the wind carries no energy
        assert_eq!(field.phillips(Vec2::new(0.0, 0.5)), 0.0);
        let along = field.phillips(Vec2::new(0.5, 0.0));
        let against = field.phillips(Vec2::new(-0.5, 0.0));
        assert!(along > 0.0);
        assert!((along - against).abs() < 1e-9);
        // long waves are suppressed at low wind speed
        assert!(field.phillips(Vec2::new(0.01, 0.0)) < 1e-12);
    }

    #[test]
    fn test_wavevector_centred() {
        let field = small(1);
        assert_eq!(field.wavevector(8, 8), Vec2::ZERO);
        let k = field.wavevector(9, 8);
        assert!((k.x - 2.0 * PI / 256.0).abs() < 1e-6);
        assert_eq!(k.y, 0.0);
    }

    #[test]
    fn test_same_seed_is_identical() {
        let mut a = small(9);
        let mut b = small(9);
        a.step(0.0);
        b.step(0.0);
        let bytes_a: Vec<u32> = a.heights().iter().map(|h| h.to_bits()).collect();
        let bytes_b: Vec<u32> = b.heights().iter().map(|h| h.to_bits()).collect();
        assert_eq!(bytes_a, bytes_b);

        let mut c = small(10);
        c.step(0.0);
        assert_ne!(a.heights(), c.heights());
    }

    #[test]
    fn test_step_is_pure_in_time() {
        let mut field = small(3);
        field.step(1.5);
        let first = field.heights().to_vec();
        field.step(4.0);
        assert_ne!(field.heights(), &first[..]);
        field.step(1.5);
        assert_eq!(field.heights(), &first[..]);
    }

    #[test]
    fn test_single_mode_is_cosine() {
        let mut field = small(1);
        let n = 16;
        for amp in field.amp_positive.iter_mut().chain(field.amp_negative.iter_mut()) {
            *amp = Complex32::new(0.0, 0.0);
        }
        // one cycle along X
        field.amp_positive[(n / 2 + 1) * n + n / 2] = Complex32::new(1.0, 0.0);
        field.step(0.0);

        for i in 0..n {
            let expected = (2.0 * PI * i as f32 / n as f32).cos();
            for j in 0..n {
                let h = field.heights()[i * n + j];
                assert!((h - expected).abs() < 1e-4, "({i}, {j}): {h} vs {expected}");
            }
        }
    }

    #[test]
    fn test_heights_are_finite_and_nonzero() {
        let mut field = small(5);
        field.step(2.0);
        assert!(field.heights().iter().all(|h| h.is_finite()));
        assert!(field.heights().iter().any(|h| h.abs() > 1e-6));
    }

    #[test]
    fn test_initialize_normalizes_wind() {
        let mut field = small(5);
        field.initialize(Vec2::new(0.0, 4.0));
        assert!((field.params().wind_direction - Vec2::Y).length() < 1e-6);
        field.initialize(Vec2::ZERO);
        assert_eq!(field.params().wind_direction, Vec2::X);
    }
}
