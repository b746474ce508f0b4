use serde::{Deserialize, Serialize};

use crate::api::Generator;

/// A regular grid of sample points. `size[2] == 0` requests a 2-D grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRequest {
    pub origin: [f64; 3],
    pub size: [u32; 3],
    pub step: f64,
}

/// Row-major samples, x varying fastest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegionResult {
    Scalar2D { width: u32, height: u32, data: Vec<f64> },
    Scalar3D { width: u32, height: u32, depth: u32, data: Vec<f64> },
}

impl RegionResult {
    pub fn data(&self) -> &[f64] {
        match self {
            RegionResult::Scalar2D { data, .. } | RegionResult::Scalar3D { data, .. } => data,
        }
    }
}

/// Samples `gen` in double precision at every point of `req`.
pub fn sample_region(gen: &dyn Generator, req: &RegionRequest) -> RegionResult {
    let [width, height, depth] = req.size;
    let at = |axis: usize, i: u32| req.origin[axis] + i as f64 * req.step;

    if depth == 0 {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height { for x in 0..width {
            data.push(gen.eval64(&[at(0, x), at(1, y)]));
        }}
        return RegionResult::Scalar2D { width, height, data };
    }

    let mut data = Vec::with_capacity(width as usize * height as usize * depth as usize);
    for z in 0..depth { for y in 0..height { for x in 0..width {
        data.push(gen.eval64(&[at(0, x), at(1, y), at(2, z)]));
    }}}
    RegionResult::Scalar3D { width, height, depth, data }
}
