use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoiseError {
    #[error("unsupported noise algorithm: {0}")]
    UnsupportedAlgorithm(Algorithm),
    #[error(
        "the function must return a value between -1 and 1 ({precision} probe returned {value})"
    )]
    OutOfRangeFunction { precision: Precision, value: f64 },
    #[error("{precision} evaluation function is already set")]
    AlreadyBoundFunction { precision: Precision },
    #[error("{precision} evaluation function is not set")]
    FunctionNotSet { precision: Precision },
    #[error("Config error: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed(pub i64);

impl From<i64> for Seed {
    fn from(value: i64) -> Self {
        Seed(value)
    }
}

impl Seed {
    /// Folds the seed into 32 bits for engines with narrower seeds.
    pub fn fold32(self) -> u32 {
        let s = self.0 as u64;
        (s ^ (s >> 32)) as u32
    }
}

/// Selects which noise algorithm a generator is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    Unknown,
    Perlin,
    OpenSimplex,
    Custom,
}

impl From<i32> for Algorithm {
    fn from(value: i32) -> Self {
        match value {
            1 => Algorithm::Perlin,
            2 => Algorithm::OpenSimplex,
            3 => Algorithm::Custom,
            _ => Algorithm::Unknown,
        }
    }
}

impl FromStr for Algorithm {
    type Err = std::convert::Infallible;

    // Unrecognized names map to `Unknown` so the factory reports them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "perlin" => Algorithm::Perlin,
            "opensimplex" | "open_simplex" => Algorithm::OpenSimplex,
            "custom" => Algorithm::Custom,
            _ => Algorithm::Unknown,
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Unknown => "unknown",
            Algorithm::Perlin => "perlin",
            Algorithm::OpenSimplex => "opensimplex",
            Algorithm::Custom => "custom",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Single,
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => f.write_str("float32"),
            Precision::Double => f.write_str("float64"),
        }
    }
}

/// Coordinates of a sample point, classified by dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coords<T> {
    Zero,
    One(T),
    Two(T, T),
    Three(T, T, T),
    TooMany,
}

impl<T: Copy> Coords<T> {
    pub fn from_slice(dim: &[T]) -> Self {
        match *dim {
            [] => Coords::Zero,
            [x] => Coords::One(x),
            [x, y] => Coords::Two(x, y),
            [x, y, z] => Coords::Three(x, y, z),
            _ => Coords::TooMany,
        }
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> Coords<U> {
        match self {
            Coords::Zero => Coords::Zero,
            Coords::One(x) => Coords::One(f(x)),
            Coords::Two(x, y) => Coords::Two(f(x), f(y)),
            Coords::Three(x, y, z) => Coords::Three(f(x), f(y), f(z)),
            Coords::TooMany => Coords::TooMany,
        }
    }

    /// Number of dimensions an engine would be asked to evaluate, if any.
    pub fn dimensions(&self) -> Option<usize> {
        match self {
            Coords::One(..) => Some(1),
            Coords::Two(..) => Some(2),
            Coords::Three(..) => Some(3),
            Coords::Zero | Coords::TooMany => None,
        }
    }
}

impl<T: Copy> From<&[T]> for Coords<T> {
    fn from(dim: &[T]) -> Self {
        Coords::from_slice(dim)
    }
}

/// User noise function for single precision: `(seed, coordinates) -> value`.
pub type EvalFn32 = Box<dyn Fn(i64, &[f32]) -> f32 + Send + Sync>;
/// User noise function for double precision: `(seed, coordinates) -> value`.
pub type EvalFn64 = Box<dyn Fn(i64, &[f64]) -> f64 + Send + Sync>;

/// Common evaluation contract of every noise generator.
///
/// `eval32`/`eval64` take up to three coordinates (x, y, z). No coordinates,
/// or more than three, evaluate to exactly `0`. The same seed and
/// coordinates always produce the same value within one precision.
pub trait Generator: Send + Sync {
    fn algorithm(&self) -> Algorithm;
    fn seed(&self) -> Seed;
    fn eval32(&self, dim: &[f32]) -> f32;
    fn eval64(&self, dim: &[f64]) -> f64;
    fn set_eval32(&mut self, f: EvalFn32) -> Result<(), NoiseError>;
    fn set_eval64(&mut self, f: EvalFn64) -> Result<(), NoiseError>;

    /// Like `eval32`, but reports a missing custom function instead of panicking.
    fn try_eval32(&self, dim: &[f32]) -> Result<f32, NoiseError> {
        Ok(self.eval32(dim))
    }

    /// Like `eval64`, but reports a missing custom function instead of panicking.
    fn try_eval64(&self, dim: &[f64]) -> Result<f64, NoiseError> {
        Ok(self.eval64(dim))
    }
}

#[inline]
pub(crate) fn clamp_unit32(v: f32) -> f32 {
    v.clamp(-1.0, 1.0)
}

#[inline]
pub(crate) fn clamp_unit64(v: f64) -> f64 {
    v.clamp(-1.0, 1.0)
}
