use std::sync::OnceLock;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use noise::{NoiseFn, OpenSimplex};
use tracing::debug;

use crate::api::*;

/// Coordinates beyond this magnitude, or non-finite ones, evaluate to `0`.
/// `noise::OpenSimplex` panics on lattice indices past roughly `1e20`.
pub const MAX_COORD: f64 = 1e18;

fn in_domain64(dim: &[f64]) -> bool {
    dim.iter().all(|c| c.is_finite() && c.abs() <= MAX_COORD)
}

fn in_domain32(dim: &[f32]) -> bool {
    dim.iter().all(|&c| c.is_finite() && f64::from(c).abs() <= MAX_COORD)
}

/// Seeded OpenSimplex noise generator.
///
/// OpenSimplex has no 1-D form; a single coordinate `x` is evaluated as the
/// 2-D sample `(x, x)`.
pub struct OpenSimplexNoise {
    seed: Seed,
    single: OnceLock<FastNoiseLite>,
    double: OnceLock<OpenSimplex>,
}

impl OpenSimplexNoise {
    pub fn new(seed: i64) -> Self {
        Self { seed: Seed::from(seed), single: OnceLock::new(), double: OnceLock::new() }
    }

    fn single(&self) -> &FastNoiseLite {
        self.single.get_or_init(|| {
            debug!(seed = self.seed.0, "building float32 opensimplex engine");
            let mut f = FastNoiseLite::with_seed(self.seed.fold32() as i32);
            f.set_noise_type(Some(NoiseType::OpenSimplex2));
            f.set_frequency(Some(1.0));
            f
        })
    }

    fn double(&self) -> &OpenSimplex {
        self.double.get_or_init(|| {
            debug!(seed = self.seed.0, "building float64 opensimplex engine");
            OpenSimplex::new(self.seed.fold32())
        })
    }
}

impl Generator for OpenSimplexNoise {
    fn algorithm(&self) -> Algorithm {
        Algorithm::OpenSimplex
    }

    fn seed(&self) -> Seed {
        self.seed
    }

    fn eval32(&self, dim: &[f32]) -> f32 {
        if !in_domain32(dim) {
            return 0.0;
        }
        let v = match Coords::from(dim) {
            Coords::One(x) => self.single().get_noise_2d(x, x),
            Coords::Two(x, y) => self.single().get_noise_2d(x, y),
            Coords::Three(x, y, z) => self.single().get_noise_3d(x, y, z),
            Coords::Zero | Coords::TooMany => return 0.0,
        };
        clamp_unit32(v)
    }

    fn eval64(&self, dim: &[f64]) -> f64 {
        if !in_domain64(dim) {
            return 0.0;
        }
        let v = match Coords::from(dim) {
            Coords::One(x) => self.double().get([x, x]),
            Coords::Two(x, y) => self.double().get([x, y]),
            Coords::Three(x, y, z) => self.double().get([x, y, z]),
            Coords::Zero | Coords::TooMany => return 0.0,
        };
        clamp_unit64(v)
    }

    fn set_eval32(&mut self, _f: EvalFn32) -> Result<(), NoiseError> {
        Err(NoiseError::AlreadyBoundFunction { precision: Precision::Single })
    }

    fn set_eval64(&mut self, _f: EvalFn64) -> Result<(), NoiseError> {
        Err(NoiseError::AlreadyBoundFunction { precision: Precision::Double })
    }
}
