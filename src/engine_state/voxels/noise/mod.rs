//! # Noise Module
//!
//! Deterministic fractal noise used by terrain generation.
//!
//! [`NoiseField`] combines 2D simplex gradient noise over a fixed permutation
//! lattice with multi-octave fractal Brownian motion (fbm) for the terrain height
//! field, and exposes 3D Perlin noise for carving caves.
//!
//! ## Determinism
//!
//! Every table is built from constants and no random state is consulted, so the
//! same input and the same construction parameters always yield the same value,
//! in every process.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

mod permutation;

use permutation::{build_lookup_tables, GRADIENTS};

/// Construction parameters of a [`NoiseField`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// Scale applied to input coordinates by [`NoiseField::sample`].
    pub zoom: f64,
    /// Number of fbm octaves.
    pub octaves: u32,
    /// Amplitude decay per octave.
    pub persistence: f64,
    /// Offset added to the fbm sum (and to its normalization weight).
    pub base_elevation: f64,
    /// Seed of the 3D lattice used by [`NoiseField::noise3d`].
    pub seed: u32,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            octaves: 4,
            persistence: 0.5,
            base_elevation: 0.0,
            seed: 0,
        }
    }
}

/// A pure, deterministic 2D/3D noise generator.
///
/// # Examples
///
/// ```
/// use voxel_streaming::NoiseField;
///
/// let field = NoiseField::default();
/// let a = field.fbm(12.5, -3.25);
/// let b = field.fbm(12.5, -3.25);
/// assert_eq!(a, b);
/// assert!((-1.0..=1.0).contains(&a));
/// ```
pub struct NoiseField {
    parameters: NoiseParameters,
    /// Permutation duplicated to 512 entries
    points: [u8; 512],
    /// `points` modulo the gradient count
    points_mod12: [u8; 512],
    /// Skew factor from input space to the simplex lattice
    f2: f64,
    /// Unskew factor back from the lattice
    g2: f64,
    perlin: Perlin,
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(NoiseParameters::default())
    }
}

impl NoiseField {
    /// Creates a noise field and precomputes its lattice tables.
    pub fn new(parameters: NoiseParameters) -> Self {
        let (points, points_mod12) = build_lookup_tables();

        NoiseField {
            parameters,
            points,
            points_mod12,
            f2: 0.5 * (3.0_f64.sqrt() - 1.0),
            g2: (3.0 - 3.0_f64.sqrt()) / 6.0,
            perlin: Perlin::new(parameters.seed),
        }
    }

    /// The parameters this field was built with.
    pub fn parameters(&self) -> &NoiseParameters {
        &self.parameters
    }

    /// Single-octave simplex noise in roughly `[-1, 1]`.
    pub fn noise2d(&self, x: f64, y: f64) -> f64 {
        let s = (x + y) * self.f2;
        let i = fast_floor(x + s);
        let j = fast_floor(y + s);

        let t = (i + j) as f64 * self.g2;
        let x0 = x - (i as f64 - t);
        let y0 = y - (j as f64 - t);

        // which of the two triangles of the skewed cell we are in
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + self.g2;
        let y1 = y0 - j1 as f64 + self.g2;
        let x2 = x0 - 1.0 + 2.0 * self.g2;
        let y2 = y0 - 1.0 + 2.0 * self.g2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;

        let gi0 = self.points_mod12[ii + self.points[jj] as usize] as usize;
        let gi1 = self.points_mod12[ii + i1 + self.points[jj + j1] as usize] as usize;
        let gi2 = self.points_mod12[ii + 1 + self.points[jj + 1] as usize] as usize;

        let n0 = corner_contribution(x0, y0, &GRADIENTS[gi0]);
        let n1 = corner_contribution(x1, y1, &GRADIENTS[gi1]);
        let n2 = corner_contribution(x2, y2, &GRADIENTS[gi2]);

        70.0 * (n0 + n1 + n2)
    }

    /// Multi-octave fractal Brownian motion over [`Self::noise2d`].
    ///
    /// The sum is divided by the accumulated maximum amplitude, so the output stays
    /// in the same range whatever the octave count.
    pub fn fbm(&self, x: f64, y: f64) -> f64 {
        let mut value = self.parameters.base_elevation;
        let mut max_value = self.parameters.base_elevation;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;

        for _ in 0..self.parameters.octaves {
            value += self.noise2d(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= self.parameters.persistence;
            frequency *= 2.0;
        }

        if max_value == 0.0 {
            return 0.0;
        }

        value / max_value
    }

    /// [`Self::fbm`] of the input scaled by the configured zoom.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.fbm(x * self.parameters.zoom, y * self.parameters.zoom)
    }

    /// Maps [`Self::sample`] to a 0..=255 grey level (negative values clamp to black).
    pub fn grey_value(&self, x: i32, y: i32) -> u8 {
        let noise = self.sample(x as f64, y as f64);
        fast_floor(interpolate(0.0, 255.0, noise)).clamp(0, 255) as u8
    }

    /// 3D Perlin noise in roughly `[-1, 1]`, used for cave carving.
    pub fn noise3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.perlin.get([x, y, z])
    }
}

fn fast_floor(value: f64) -> i64 {
    let int_value = value as i64;
    if value < int_value as f64 {
        int_value - 1
    } else {
        int_value
    }
}

fn interpolate(from: f64, to: f64, alpha: f64) -> f64 {
    if alpha < 0.0 {
        return from;
    }
    if alpha > 1.0 {
        return to;
    }
    (1.0 - alpha) * from + alpha * to
}

fn corner_contribution(x: f64, y: f64, gradient: &[f64; 3]) -> f64 {
    let mut t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    t *= t;
    t * t * (gradient[0] * x + gradient[1] * y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> impl Iterator<Item = (f64, f64)> {
        (-40..40).flat_map(|i| (-40..40).map(move |j| (i as f64 * 0.37, j as f64 * 0.53)))
    }

    #[test]
    fn noise2d_stays_in_unit_range() {
        let field = NoiseField::default();
        for (x, y) in sample_points() {
            let value = field.noise2d(x, y);
            assert!((-1.0..=1.0).contains(&value), "noise2d({x}, {y}) = {value}");
        }
    }

    #[test]
    fn fbm_is_deterministic_across_instances() {
        let first = NoiseField::default();
        let second = NoiseField::default();
        for (x, y) in sample_points() {
            assert_eq!(first.fbm(x, y).to_bits(), second.fbm(x, y).to_bits());
        }
    }

    #[test]
    fn fbm_range_is_independent_of_octave_count() {
        for octaves in [1, 2, 4, 8] {
            let field = NoiseField::new(NoiseParameters {
                octaves,
                ..NoiseParameters::default()
            });
            for (x, y) in sample_points() {
                let value = field.fbm(x, y);
                assert!((-1.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn noise_is_zero_on_lattice_origin() {
        let field = NoiseField::default();
        assert_eq!(field.noise2d(0.0, 0.0), 0.0);
    }

    #[test]
    fn zero_octaves_without_elevation_is_flat() {
        let field = NoiseField::new(NoiseParameters {
            octaves: 0,
            ..NoiseParameters::default()
        });
        assert_eq!(field.fbm(3.0, 4.0), 0.0);
    }

    #[test]
    fn noise_matches_reference_values() {
        let field = NoiseField::default();
        let octaves6 = NoiseField::new(NoiseParameters {
            octaves: 6,
            persistence: 0.6,
            ..NoiseParameters::default()
        });
        // (x, y, noise2d, fbm with 4 octaves, fbm with 6 octaves at persistence 0.6)
        let expected = [
            (0.5, 0.5, -0.3071565136272162, -0.2836422625143143, -0.2722816492961389),
            (1.25, -3.75, -0.4425075597435131, -0.2190538402087188, -0.16367061699091986),
            (-7.3, 2.9, -0.025654547726782086, 0.05341480312710738, 0.1213136061348921),
            (100.1, -42.42, 0.49424478518727033, 0.07093344032230006, 0.0413338311513471),
        ];

        for (x, y, noise, fbm, fbm6) in expected {
            assert!((field.noise2d(x, y) - noise).abs() < 1e-12, "noise2d({x}, {y})");
            assert!((field.fbm(x, y) - fbm).abs() < 1e-12, "fbm({x}, {y})");
            assert!((octaves6.fbm(x, y) - fbm6).abs() < 1e-12, "6-octave fbm({x}, {y})");
        }
    }

    #[test]
    fn grey_value_scales_positive_samples_and_clamps_negative_ones() {
        let field = NoiseField::new(NoiseParameters {
            zoom: 0.05,
            ..NoiseParameters::default()
        });

        assert_eq!(field.grey_value(0, 0), 0);
        assert_eq!(field.grey_value(3, 7), 0);
        assert_eq!(field.grey_value(-25, 13), 61);
        assert_eq!(field.grey_value(-40, -22), 155);

        let (mut black, mut lit) = (0, 0);
        for x in (-40..40).step_by(7) {
            for y in (-40..40).step_by(9) {
                let sample = field.sample(x as f64, y as f64);
                let grey = field.grey_value(x, y);
                if sample <= 0.0 {
                    assert_eq!(grey, 0, "sample {sample} at ({x}, {y})");
                    black += 1;
                } else {
                    let expected = (sample * 255.0).floor() as u8;
                    assert_eq!(grey, expected, "sample {sample} at ({x}, {y})");
                    lit += 1;
                }
            }
        }
        assert!(black > 0 && lit > 0);
    }

    #[test]
    fn fast_floor_rounds_towards_negative_infinity() {
        assert_eq!(fast_floor(1.5), 1);
        assert_eq!(fast_floor(-1.5), -2);
        assert_eq!(fast_floor(-2.0), -2);
    }
}
