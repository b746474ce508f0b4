//! One evaluation contract over several procedural noise algorithms.
//!
//! ```
//! use noise_facade::{Algorithm, Generator};
//!
//! let gen = noise_facade::new(Algorithm::Perlin, 100).unwrap();
//! let v = gen.eval64(&[0.5, 1.25]);
//! assert!((-1.0..=1.0).contains(&v));
//! ```

pub mod api;
pub mod config;
pub mod custom;
pub mod opensimplex;
pub mod perlin;
pub mod probe;
pub mod sampling;

pub use api::{Algorithm, Coords, EvalFn32, EvalFn64, Generator, NoiseError, Precision, Seed};
pub use config::GeneratorConfig;
pub use custom::CustomNoise;
pub use opensimplex::OpenSimplexNoise;
pub use perlin::{PerlinNoise, PerlinParams};
pub use probe::Probe;
pub use sampling::{sample_region, RegionRequest, RegionResult};

use tracing::{debug, warn};

/// Creates a generator for `algorithm` seeded with `seed`.
///
/// `Custom` generators need [`Generator::set_eval32`] / [`Generator::set_eval64`]
/// before they can be evaluated.
pub fn new(algorithm: Algorithm, seed: i64) -> Result<Box<dyn Generator>, NoiseError> {
    let gen: Box<dyn Generator> = match algorithm {
        Algorithm::Perlin => Box::new(PerlinNoise::new(seed)),
        Algorithm::OpenSimplex => Box::new(OpenSimplexNoise::new(seed)),
        Algorithm::Custom => Box::new(CustomNoise::new(seed)),
        Algorithm::Unknown => {
            warn!(%algorithm, "unsupported noise algorithm requested");
            return Err(NoiseError::UnsupportedAlgorithm(algorithm));
        }
    };
    debug!(%algorithm, seed, "created noise generator");
    Ok(gen)
}

/// Perlin generator with non-default octave parameters.
pub fn new_perlin_with(seed: i64, params: PerlinParams) -> Result<Box<dyn Generator>, NoiseError> {
    Ok(Box::new(PerlinNoise::with_params(seed, params)?))
}
