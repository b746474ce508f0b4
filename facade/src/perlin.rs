//! Perlin gradient noise.
//!
//! The lattice is a 256-entry permutation shuffled by a seeded `StdRng`,
//! duplicated to 512 entries so corner lookups never wrap. Octaves are summed
//! with each one divided by `smoothness^i` and sampled at `scale^i` times the
//! input coordinates, then normalized by the total weight.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::*;

/// Default per-octave amplitude divisor (alpha).
pub const SMOOTHNESS: f64 = 2.0;
/// Default per-octave frequency multiplier (beta).
pub const SCALE: f64 = 2.0;
/// Default number of octaves.
pub const OCTAVES: u32 = 3;
/// Upper bound on `octaves`.
pub const MAX_OCTAVES: u32 = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerlinParams {
    /// Weight divisor between octaves. Smaller values keep more of the fine detail.
    pub smoothness: f64,
    /// Frequency multiplier between octaves.
    pub scale: f64,
    pub octaves: u32,
}

impl Default for PerlinParams {
    fn default() -> Self {
        Self { smoothness: SMOOTHNESS, scale: SCALE, octaves: OCTAVES }
    }
}

impl PerlinParams {
    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return Err(NoiseError::Config(format!(
                "perlin octaves must be between 1 and {MAX_OCTAVES}, got {}",
                self.octaves
            )));
        }
        if !(self.smoothness.is_finite() && self.smoothness > 0.0) {
            return Err(NoiseError::Config(format!(
                "perlin smoothness must be positive, got {}",
                self.smoothness
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(NoiseError::Config(format!(
                "perlin scale must be positive, got {}",
                self.scale
            )));
        }
        // The last octave's weight and frequency must stay finite and non-zero.
        let n = self.octaves as i32;
        let amp = self.smoothness.powi(n);
        if amp == 0.0 || !amp.is_finite() || !amp.recip().is_finite() {
            return Err(NoiseError::Config(format!(
                "perlin smoothness {} over {} octaves leaves the f64 range",
                self.smoothness, self.octaves
            )));
        }
        let freq = self.scale.powi(n);
        if freq == 0.0 || !freq.is_finite() {
            return Err(NoiseError::Config(format!(
                "perlin scale {} over {} octaves leaves the f64 range",
                self.scale, self.octaves
            )));
        }
        Ok(())
    }
}

struct Lattice {
    perm: [u8; 512],
}

impl Lattice {
    fn new(seed: Seed) -> Self {
        let mut rng = StdRng::seed_from_u64(seed.0 as u64);
        let mut p: [u8; 256] = std::array::from_fn(|i| i as u8);
        p.shuffle(&mut rng);
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = p[i & 255];
        }
        Self { perm }
    }

    #[inline]
    fn p(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    // Raw 1-D noise, stretched to roughly [-1, 1].
    fn noise1(&self, x: f64) -> f64 {
        let xi = cell(x);
        let xf = x - x.floor();
        let u = fade(xf);
        2.0 * lerp(grad1(self.p(xi), xf), grad1(self.p(xi + 1), xf - 1.0), u)
    }

    fn noise2(&self, x: f64, y: f64) -> f64 {
        let (xi, yi) = (cell(x), cell(y));
        let (xf, yf) = (x - x.floor(), y - y.floor());
        let (u, v) = (fade(xf), fade(yf));

        let a = self.p(xi);
        let b = self.p(xi + 1);
        let aa = self.p(a + yi);
        let ab = self.p(a + yi + 1);
        let ba = self.p(b + yi);
        let bb = self.p(b + yi + 1);

        let x1 = lerp(grad2(aa, xf, yf), grad2(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad2(ab, xf, yf - 1.0), grad2(bb, xf - 1.0, yf - 1.0), u);
        lerp(x1, x2, v)
    }

    fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        let (xi, yi, zi) = (cell(x), cell(y), cell(z));
        let (xf, yf, zf) = (x - x.floor(), y - y.floor(), z - z.floor());
        let (u, v, w) = (fade(xf), fade(yf), fade(zf));

        let a = self.p(xi) + yi;
        let aa = self.p(a) + zi;
        let ab = self.p(a + 1) + zi;
        let b = self.p(xi + 1) + yi;
        let ba = self.p(b) + zi;
        let bb = self.p(b + 1) + zi;

        let near = lerp(
            lerp(grad3(self.p(aa), xf, yf, zf), grad3(self.p(ba), xf - 1.0, yf, zf), u),
            lerp(grad3(self.p(ab), xf, yf - 1.0, zf), grad3(self.p(bb), xf - 1.0, yf - 1.0, zf), u),
            v,
        );
        let far = lerp(
            lerp(
                grad3(self.p(aa + 1), xf, yf, zf - 1.0),
                grad3(self.p(ba + 1), xf - 1.0, yf, zf - 1.0),
                u,
            ),
            lerp(
                grad3(self.p(ab + 1), xf, yf - 1.0, zf - 1.0),
                grad3(self.p(bb + 1), xf - 1.0, yf - 1.0, zf - 1.0),
                u,
            ),
            v,
        );
        lerp(near, far, w)
    }
}

#[inline]
fn cell(t: f64) -> usize {
    (t.floor() as i64 & 255) as usize
}

// 6t^5 - 15t^4 + 10t^3
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn grad1(hash: usize, x: f64) -> f64 {
    if hash & 1 == 0 { x } else { -x }
}

#[inline]
fn grad2(hash: usize, x: f64, y: f64) -> f64 {
    let h = hash & 0xF;
    let u = if h < 8 { x } else { y };
    let v = if h < 8 { y } else { x };
    let su = if h & 1 == 0 { u } else { -u };
    let sv = if h & 2 == 0 { v } else { -v };
    (su + sv) * 0.5
}

// 12 cube-edge directions, padded to 16
#[inline]
fn grad3(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 0xF;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let su = if h & 1 == 0 { u } else { -u };
    let sv = if h & 2 == 0 { v } else { -v };
    su + sv
}

/// Seeded Perlin noise generator.
pub struct PerlinNoise {
    seed: Seed,
    params: PerlinParams,
    lattice: OnceLock<Lattice>,
}

impl PerlinNoise {
    /// Perlin noise with the default smoothness, scale and octave count.
    pub fn new(seed: i64) -> Self {
        Self { seed: Seed::from(seed), params: PerlinParams::default(), lattice: OnceLock::new() }
    }

    pub fn with_params(seed: i64, params: PerlinParams) -> Result<Self, NoiseError> {
        params.validate()?;
        Ok(Self { seed: Seed::from(seed), params, lattice: OnceLock::new() })
    }

    pub fn params(&self) -> &PerlinParams {
        &self.params
    }

    fn lattice(&self) -> &Lattice {
        self.lattice.get_or_init(|| {
            debug!(seed = self.seed.0, "building perlin lattice");
            Lattice::new(self.seed)
        })
    }

    fn octaves(&self, sample: impl Fn(f64) -> f64) -> f64 {
        let mut amp = 1.0;
        let mut freq = 1.0;
        let mut total = 0.0;
        let mut weight = 0.0;
        for _ in 0..self.params.octaves {
            total += sample(freq) / amp;
            weight += 1.0 / amp;
            amp *= self.params.smoothness;
            freq *= self.params.scale;
        }
        // Coordinates near f64::MAX overflow once scaled.
        let v = total / weight;
        if v.is_finite() { clamp_unit64(v) } else { 0.0 }
    }

    fn eval(&self, coords: Coords<f64>) -> f64 {
        match coords {
            Coords::One(x) => {
                let l = self.lattice();
                self.octaves(|k| l.noise1(x * k))
            }
            Coords::Two(x, y) => {
                let l = self.lattice();
                self.octaves(|k| l.noise2(x * k, y * k))
            }
            Coords::Three(x, y, z) => {
                let l = self.lattice();
                self.octaves(|k| l.noise3(x * k, y * k, z * k))
            }
            Coords::Zero | Coords::TooMany => 0.0,
        }
    }
}

impl Generator for PerlinNoise {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Perlin
    }

    fn seed(&self) -> Seed {
        self.seed
    }

    // Computed in double precision and narrowed.
    fn eval32(&self, dim: &[f32]) -> f32 {
        clamp_unit32(self.eval(Coords::from(dim).map(f64::from)) as f32)
    }

    fn eval64(&self, dim: &[f64]) -> f64 {
        self.eval(Coords::from(dim))
    }

    fn set_eval32(&mut self, _f: EvalFn32) -> Result<(), NoiseError> {
        Err(NoiseError::AlreadyBoundFunction { precision: Precision::Single })
    }

    fn set_eval64(&mut self, _f: EvalFn64) -> Result<(), NoiseError> {
        Err(NoiseError::AlreadyBoundFunction { precision: Precision::Double })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perlin_defaults() {
        let p = PerlinNoise::new(100);
        assert_eq!(p.params().smoothness, 2.0);
        assert_eq!(p.params().scale, 2.0);
        assert_eq!(p.params().octaves, 3);
        assert_eq!(p.seed(), Seed(100));
        assert_eq!(p.algorithm(), Algorithm::Perlin);
    }

    #[test]
    fn perlin_determinism() {
        let a = PerlinNoise::new(1234);
        let b = PerlinNoise::new(1234);
        for pt in [[10.5, -3.7, 0.25], [0.1, 0.2, 0.3], [-250.75, 99.9, 7.125]] {
            assert_eq!(a.eval64(&pt[..1]).to_bits(), b.eval64(&pt[..1]).to_bits());
            assert_eq!(a.eval64(&pt[..2]).to_bits(), b.eval64(&pt[..2]).to_bits());
            assert_eq!(a.eval64(&pt).to_bits(), b.eval64(&pt).to_bits());
        }
    }

    #[test]
    // Gradient noise vanishes on lattice points.
    fn perlin_zero_on_integers() {
        let p = PerlinNoise::new(100);
        for x in [0.0, 1.0, 2.0, -7.0] {
            assert_eq!(p.eval64(&[x]), 0.0);
            assert_eq!(p.eval64(&[x, 3.0]), 0.0);
            assert_eq!(p.eval64(&[x, 3.0, -4.0]), 0.0);
        }
    }

    #[test]
    fn perlin_seeds_differ() {
        let a = PerlinNoise::new(1);
        let b = PerlinNoise::new(2);
        let differs = (0..32).any(|i| {
            let x = i as f64 * 0.37 + 0.13;
            a.eval64(&[x, x * 0.5]) != b.eval64(&[x, x * 0.5])
        });
        assert!(differs);
    }

    #[test]
    fn perlin_single_tracks_double() {
        let p = PerlinNoise::new(42);
        for pt in [[0.3f32, 1.7, 2.2], [15.5, -8.25, 0.75]] {
            let wide = p.eval64(&[pt[0] as f64, pt[1] as f64, pt[2] as f64]);
            let narrow = p.eval32(&pt);
            assert!((wide as f32 - narrow).abs() < 1e-6);
        }
    }

    #[test]
    fn perlin_rejects_custom_function() {
        let mut p = PerlinNoise::new(0);
        let err = p.set_eval32(Box::new(|_, _| 0.0)).unwrap_err();
        assert!(matches!(err, NoiseError::AlreadyBoundFunction { precision: Precision::Single }));
        let err = p.set_eval64(Box::new(|_, _| 0.0)).unwrap_err();
        assert_eq!(err.to_string(), "float64 evaluation function is already set");
    }

    fn params(smoothness: f64, scale: f64, octaves: u32) -> PerlinParams {
        PerlinParams { smoothness, scale, octaves }
    }

    #[test]
    fn perlin_params_validation() {
        assert!(PerlinNoise::with_params(0, params(2.0, 2.0, 0)).is_err());
        assert!(PerlinNoise::with_params(0, params(0.0, 2.0, 3)).is_err());
        assert!(PerlinNoise::with_params(0, params(2.0, f64::NAN, 3)).is_err());
        let p = PerlinNoise::with_params(0, params(2.0, 2.0, 6)).unwrap();
        assert_eq!(p.params().octaves, 6);
    }

    #[test]
    fn perlin_params_must_stay_in_f64_range() {
        assert!(PerlinNoise::with_params(1, params(2.0, 2.0, 1100)).is_err());
        assert!(PerlinNoise::with_params(1, params(2.0, 2.0, MAX_OCTAVES + 1)).is_err());
        assert!(PerlinNoise::with_params(1, params(1e-10, 2.0, 40)).is_err());
        assert!(PerlinNoise::with_params(1, params(1e-20, 2.0, 20)).is_err());
        assert!(PerlinNoise::with_params(1, params(1e20, 2.0, 20)).is_err());
        assert!(PerlinNoise::with_params(1, params(2.0, 1e20, 20)).is_err());
        assert!(PerlinNoise::with_params(1, params(2.0, 1e-20, 20)).is_err());
    }

    #[test]
    fn perlin_extreme_accepted_params_stay_in_range() {
        for p in [params(1e-9, 1e9, MAX_OCTAVES), params(1e9, 1e-9, MAX_OCTAVES)] {
            let gen = PerlinNoise::with_params(1, p).unwrap();
            for pt in [[0.3, 0.7, 0.1], [123.456, -9.5, 1e6]] {
                for n in 1..=3 {
                    let v = gen.eval64(&pt[..n]);
                    assert!((-1.0..=1.0).contains(&v), "{pt:?}[..{n}] = {v}");
                }
            }
        }
    }

    #[test]
    fn perlin_overflowing_coordinates_give_zero() {
        let gen = PerlinNoise::new(1);
        assert_eq!(gen.eval64(&[f64::MAX, 0.5]), 0.0);
        assert_eq!(gen.eval64(&[f64::NAN]), 0.0);
        assert_eq!(gen.eval64(&[0.5, f64::INFINITY, 0.25]), 0.0);
        assert_eq!(gen.eval32(&[f32::NAN, 0.5]), 0.0);
    }
}
