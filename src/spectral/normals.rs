//! Normal estimation and RGBA packing of the spectral height field.
//!
//! Each texel packs to four bytes: the normal's X, Z and Y components mapped
//! from [-1, 1] to [0, 255], then the height shifted by
//! `height_pack_offset` and clamped to a byte.

use std::path::Path;

use glam::Vec3;
use image::RgbaImage;

use super::field::SpectralWaveField;
use crate::error::{Result, SimError};

impl SpectralWaveField {
    /// Fill `out` (`4·N²` bytes) with packed normals and heights
    pub fn compute_normals_and_pack(&self, out: &mut [u8]) -> Result<()> {
        let n = self.params.grid_size;
        let expected = 4 * n * n;
        if out.len() != expected {
            return Err(SimError::BufferSize {
                expected,
                actual: out.len(),
            });
        }

        let h = &self.heights;
        let cd = self.params.normal_cell_distance_m;
        for i in 0..n {
            for j in 0..n {
                let index = i * n + j;

                // one-sided differences at the domain edge
                let across_x = if i == 0 {
                    Vec3::new(cd, h[index + n] - h[index], 0.0)
                } else if i == n - 1 {
                    Vec3::new(cd, h[index] - h[index - n], 0.0)
                } else {
                    Vec3::new(2.0 * cd, h[index + n] - h[index - n], 0.0)
                };
                let across_z = if j == 0 {
                    Vec3::new(0.0, h[index + 1] - h[index], cd)
                } else if j == n - 1 {
                    Vec3::new(0.0, h[index] - h[index - 1], cd)
                } else {
                    Vec3::new(0.0, h[index + 1] - h[index - 1], 2.0 * cd)
                };

                let normal = across_z.cross(across_x).normalize_or(Vec3::Y);
                let texel = &mut out[4 * index..4 * index + 4];
                texel[0] = unit_to_byte(normal.x);
                texel[1] = unit_to_byte(normal.z);
                texel[2] = unit_to_byte(normal.y);
                texel[3] = (h[index] + self.params.height_pack_offset).clamp(0.0, 255.0) as u8;
            }
        }

        blend_seams(out, n);
        Ok(())
    }

    /// Freshly allocated packed texture
    pub fn packed_normals(&self) -> Vec<u8> {
        let n = self.params.grid_size;
        let mut out = vec![0u8; 4 * n * n];
        // length matches by construction
        if self.compute_normals_and_pack(&mut out).is_err() {
            out.clear();
        }
        out
    }

    /// Write the packed texture as an RGBA PNG
    pub fn save_normal_map(&self, path: &Path) -> Result<()> {
        let n = self.params.grid_size;
        let bytes = self.packed_normals();
        let actual = bytes.len();
        let image = RgbaImage::from_raw(n as u32, n as u32, bytes).ok_or(SimError::BufferSize {
            expected: 4 * n * n,
            actual,
        })?;
        image.save(path)?;
        Ok(())
    }
}

fn unit_to_byte(v: f32) -> u8 {
    ((v + 1.0) / 2.0 * 255.0) as u8
}

/// Make the texture tile: row 0 mixes in the opposite row, column 0 takes the
/// mean of its inner neighbours, and both copy onto the opposite edge.
fn blend_seams(out: &mut [u8], n: usize) {
    let mix = |a: u8, wa: f32, b: u8, wb: f32| (a as f32 * wa + b as f32 * wb).round() as u8;

    for i in 0..n {
        for j in 0..n {
            let index = i * n + j;
            if i == 0 {
                let opposite = (n - 1) * n + j;
                for c in 0..3 {
                    let blended = mix(
                        out[4 * index + c],
                        2.0 / 3.0,
                        out[4 * opposite + c],
                        1.0 / 3.0,
                    );
                    out[4 * index + c] = blended;
                    out[4 * opposite + c] = blended;
                }
            }
            if j == 0 {
                let opposite = i * n + n - 1;
                let inner_a = index + 1;
                let inner_b = opposite - 1;
                for c in 0..3 {
                    let blended = mix(out[4 * inner_a + c], 0.5, out[4 * inner_b + c], 0.5);
                    out[4 * index + c] = blended;
                    out[4 * opposite + c] = blended;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SpectrumParams;

    fn field(n: usize) -> SpectralWaveField {
        SpectralWaveField::new(SpectrumParams {
            grid_size: n,
            ..SpectrumParams::default()
        })
        .unwrap()
    }

    #[test]
    fn test_flat_field_packs_up() {
        let field = field(8);
        // heights are zero until the first step
        let packed = field.packed_normals();
        assert_eq!(packed.len(), 4 * 64);
        for texel in packed.chunks(4) {
            assert_eq!(texel, &[127, 127, 255, 128]);
        }
    }

    #[test]
    fn test_wrong_buffer_size() {
        let field = field(8);
        let mut out = vec![0u8; 10];
        assert!(matches!(
            field.compute_normals_and_pack(&mut out),
            Err(SimError::BufferSize {
                expected: 256,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_height_byte_clamps() {
        let mut field = field(8);
        field.heights[9] = 500.0;
        field.heights[10] = -500.0;
        field.heights[11] = 1.6;
        let packed = field.packed_normals();
        assert_eq!(packed[4 * 9 + 3], 255);
        assert_eq!(packed[4 * 10 + 3], 0);
        assert_eq!(packed[4 * 11 + 3], 129);
    }

    #[test]
    fn test_seams_match() {
        let mut field = field(16);
        field.step(3.0);
        let packed = field.packed_normals();
        let n = 16;
        for j in 0..n {
            let top = &packed[4 * j..4 * j + 3];
            let bottom = &packed[4 * ((n - 1) * n + j)..4 * ((n - 1) * n + j) + 3];
            // last column is rewritten after the row seam
            if j != 0 && j != n - 1 {
                assert_eq!(top, bottom);
            }
        }
        // row 0 is blended again after its column seam
        for i in 1..n {
            let left = &packed[4 * i * n..4 * i * n + 3];
            let right = &packed[4 * (i * n + n - 1)..4 * (i * n + n - 1) + 3];
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_tilted_surface_normal() {
        let mut field = field(8);
        // height rises along +X (row index)
        for i in 0..8 {
            for j in 0..8 {
                field.heights[i * 8 + j] = i as f32 * 10.0;
            }
        }
        let packed = field.packed_normals();
        let texel = &packed[4 * (3 * 8 + 3)..4 * (3 * 8 + 4)];
        // normal leans toward -X
        assert!(texel[0] < 127);
        assert_eq!(texel[1], 127);
        assert!(texel[2] > 127);
    }
}
