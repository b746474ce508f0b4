//! Smoke test for user-supplied noise functions.
//!
//! A candidate is called once with the generator's seed and a random dummy
//! coordinate repeated twice. It is accepted only if that single sample lies
//! in `(-1, 1]`. One sample cannot prove the bound holds everywhere.

use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::api::{NoiseError, Precision};

static SHARED: LazyLock<Arc<Probe>> = LazyLock::new(|| Arc::new(Probe::from_entropy()));

/// Random source for dummy probe coordinates.
pub struct Probe {
    rng: Mutex<StdRng>,
}

impl Probe {
    pub fn from_entropy() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// An isolated, reproducible source.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    /// The process-wide source, seeded from entropy on first use.
    pub fn shared() -> Arc<Probe> {
        Arc::clone(&SHARED)
    }

    /// Uniform in `[0, 1)`.
    pub fn dummy32(&self) -> f32 {
        self.rng.lock().gen()
    }

    /// Uniform in `[0, 1)`.
    pub fn dummy64(&self) -> f64 {
        self.rng.lock().gen()
    }
}

/// Accepts values in `(-1, 1]`. NaN is rejected.
pub fn check_range(precision: Precision, value: f64) -> Result<(), NoiseError> {
    if value > -1.0 && value <= 1.0 {
        return Ok(());
    }
    warn!(%precision, value, "custom noise function rejected by range probe");
    Err(NoiseError::OutOfRangeFunction { precision, value })
}

/// Probes `f` with `(seed, [dummy, dummy])`.
pub fn probe_function32(
    probe: &Probe,
    seed: i64,
    f: &(dyn Fn(i64, &[f32]) -> f32 + Send + Sync),
) -> Result<(), NoiseError> {
    let dummy = probe.dummy32();
    check_range(Precision::Single, f64::from(f(seed, &[dummy, dummy])))
}

/// Probes `f` with `(seed, [dummy, dummy])`.
pub fn probe_function64(
    probe: &Probe,
    seed: i64,
    f: &(dyn Fn(i64, &[f64]) -> f64 + Send + Sync),
) -> Result<(), NoiseError> {
    let dummy = probe.dummy64();
    check_range(Precision::Double, f(seed, &[dummy, dummy]))
}
