use serde::{Deserialize, Serialize};

use crate::api::{Algorithm, Generator, NoiseError};
use crate::perlin::PerlinParams;

/// Generator settings, loadable from RON.
///
/// ```ron
/// (algorithm: OpenSimplex, seed: 42)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub algorithm: Algorithm,
    pub seed: i64,
    /// Only read for `Perlin`.
    pub perlin: PerlinParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { algorithm: Algorithm::Perlin, seed: 0, perlin: PerlinParams::default() }
    }
}

impl GeneratorConfig {
    pub fn from_ron(text: &str) -> Result<Self, NoiseError> {
        ron::from_str(text).map_err(|e| NoiseError::Config(e.to_string()))
    }

    pub fn to_ron(&self) -> Result<String, NoiseError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| NoiseError::Config(e.to_string()))
    }

    pub fn build(&self) -> Result<Box<dyn Generator>, NoiseError> {
        match self.algorithm {
            Algorithm::Perlin => crate::new_perlin_with(self.seed, self.perlin.clone()),
            algorithm => crate::new(algorithm, self.seed),
        }
    }
}
