use std::sync::Arc;

use tracing::debug;

use crate::api::*;
use crate::probe::{self, Probe};

/// Noise generator backed by user-supplied functions.
///
/// A function must be set for a precision before that precision is
/// evaluated. Evaluating an unset precision panics; use
/// [`Generator::try_eval32`]/[`Generator::try_eval64`] to get an error instead.
pub struct CustomNoise {
    seed: Seed,
    func32: Option<EvalFn32>,
    func64: Option<EvalFn64>,
    probe: Arc<Probe>,
}

impl CustomNoise {
    pub fn new(seed: i64) -> Self {
        Self::with_probe(seed, Probe::shared())
    }

    /// Uses `probe` instead of the process-wide source when validating functions.
    pub fn with_probe(seed: i64, probe: Arc<Probe>) -> Self {
        Self { seed: Seed::from(seed), func32: None, func64: None, probe }
    }

    pub fn is_set32(&self) -> bool {
        self.func32.is_some()
    }

    pub fn is_set64(&self) -> bool {
        self.func64.is_some()
    }
}

impl Generator for CustomNoise {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Custom
    }

    fn seed(&self) -> Seed {
        self.seed
    }

    fn eval32(&self, dim: &[f32]) -> f32 {
        match self.try_eval32(dim) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }

    fn eval64(&self, dim: &[f64]) -> f64 {
        match self.try_eval64(dim) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }

    fn try_eval32(&self, dim: &[f32]) -> Result<f32, NoiseError> {
        let f = self
            .func32
            .as_ref()
            .ok_or(NoiseError::FunctionNotSet { precision: Precision::Single })?;
        Ok(match Coords::from(dim).dimensions() {
            Some(_) => f(self.seed.0, dim),
            None => 0.0,
        })
    }

    fn try_eval64(&self, dim: &[f64]) -> Result<f64, NoiseError> {
        let f = self
            .func64
            .as_ref()
            .ok_or(NoiseError::FunctionNotSet { precision: Precision::Double })?;
        Ok(match Coords::from(dim).dimensions() {
            Some(_) => f(self.seed.0, dim),
            None => 0.0,
        })
    }

    fn set_eval32(&mut self, f: EvalFn32) -> Result<(), NoiseError> {
        probe::probe_function32(&self.probe, self.seed.0, f.as_ref())?;
        self.func32 = Some(f);
        debug!(seed = self.seed.0, "bound float32 custom noise function");
        Ok(())
    }

    fn set_eval64(&mut self, f: EvalFn64) -> Result<(), NoiseError> {
        probe::probe_function64(&self.probe, self.seed.0, f.as_ref())?;
        self.func64 = Some(f);
        debug!(seed = self.seed.0, "bound float64 custom noise function");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(seed: i64) -> CustomNoise {
        CustomNoise::with_probe(seed, Arc::new(Probe::seeded(1)))
    }

    #[test]
    #[should_panic(expected = "float32 evaluation function is not set")]
    fn eval32_without_function_panics() {
        let gen = custom(12345);
        let _ = gen.eval32(&[1.0, 2.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "float64 evaluation function is not set")]
    fn eval64_without_function_panics() {
        let gen = custom(12345);
        let _ = gen.eval64(&[]);
    }

    #[test]
    fn try_eval_reports_missing_function() {
        let gen = custom(12345);
        assert!(matches!(
            gen.try_eval32(&[1.0]),
            Err(NoiseError::FunctionNotSet { precision: Precision::Single })
        ));
        assert!(matches!(
            gen.try_eval64(&[1.0]),
            Err(NoiseError::FunctionNotSet { precision: Precision::Double })
        ));
    }

    #[test]
    fn out_of_range_function_is_not_bound() {
        let mut gen = custom(12345);
        let err = gen.set_eval32(Box::new(|_, _| -2.0)).unwrap_err();
        assert!(err.to_string().contains("the function must return a value between -1 and 1"));
        assert!(!gen.is_set32());

        let err = gen.set_eval64(Box::new(|_, _| -2.0)).unwrap_err();
        assert!(matches!(err, NoiseError::OutOfRangeFunction { precision: Precision::Double, .. }));
        assert!(!gen.is_set64());
    }

    #[test]
    fn lower_bound_is_exclusive() {
        let mut gen = custom(0);
        assert!(gen.set_eval64(Box::new(|_, _| -1.0)).is_err());
        assert!(gen.set_eval64(Box::new(|_, _| 1.0)).is_ok());
        assert!(gen.set_eval64(Box::new(|_, _| f64::NAN)).is_err());
    }

    #[test]
    fn rejected_replacement_keeps_previous_function() {
        let mut gen = custom(9);
        gen.set_eval64(Box::new(|_, _| 0.25)).unwrap();
        assert!(gen.set_eval64(Box::new(|_, _| 5.0)).is_err());
        assert_eq!(gen.eval64(&[1.0]), 0.25);
    }

    #[test]
    fn bound_function_sees_seed_and_caller_coordinates() {
        let mut gen = custom(321);
        gen.set_eval64(Box::new(|seed, dim| {
            if seed != 321 {
                return 1.0;
            }
            dim.iter().sum::<f64>() / 100.0
        }))
        .unwrap();
        assert_eq!(gen.eval64(&[10.0, 20.0, 30.0]), 0.6);
        assert_eq!(gen.eval64(&[-5.0]), -0.05);
    }

    #[test]
    fn unsupported_dimensions_skip_the_function() {
        let mut gen = custom(1);
        gen.set_eval32(Box::new(|_, dim| if dim.len() == 2 { 0.5 } else { 0.9 })).unwrap();
        assert_eq!(gen.eval32(&[]), 0.0);
        assert_eq!(gen.eval32(&[1.0, 2.0, 3.0, 4.0]), 0.0);
        assert_eq!(gen.eval32(&[1.0, 2.0]), 0.5);
        assert_eq!(gen.eval32(&[1.0, 2.0, 3.0]), 0.9);
    }
}
