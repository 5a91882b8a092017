//! Multi-octave fractal compositors over a 3D noise field.
//!
//! Each compositor sums `octaves` layers starting at frequency `1 / scale` and
//! amplitude 1, multiplying by `lacunarity` and `persistence` per octave, and
//! divides by the summed amplitudes so the output range does not grow with
//! the octave count. The 2D query `(x, z)` maps to noise space
//! `(x * f, offset, z * f)` where `offset` comes from the (salted) seed.

use noise::NoiseFn;
use strata_config::TerrainParameters;

use crate::salt;

/// Knobs for one fractal evaluation.
///
/// Built from [`TerrainParameters`] and then narrowed with the `with_*`
/// overrides, so callers can request another frequency band or a
/// decorrelated stream without a second noise backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalParams {
    /// Seed before the compositor's own salt is applied.
    pub seed: i64,
    /// Feature size of the first octave in world units.
    pub scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
}

impl FractalParams {
    /// Base fractal knobs of a terrain parameter set.
    pub fn from_terrain(params: &TerrainParameters) -> Self {
        Self {
            seed: params.seed,
            scale: params.scale,
            octaves: params.octaves,
            persistence: params.persistence,
            lacunarity: params.lacunarity,
        }
    }

    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    pub fn with_octaves(self, octaves: u32) -> Self {
        Self { octaves, ..self }
    }

    pub fn with_seed(self, seed: i64) -> Self {
        Self { seed, ..self }
    }
}

impl Default for FractalParams {
    fn default() -> Self {
        Self::from_terrain(&TerrainParameters::default())
    }
}

/// Shared octave loop. `shape` folds each raw noise sample.
#[inline]
fn accumulate<N, F>(noise: &N, x: f64, z: f64, params: &FractalParams, offset: f64, shape: F) -> f64
where
    N: NoiseFn<f64, 3> + ?Sized,
    F: Fn(f64) -> f64,
{
    let mut total = 0.0;
    let mut frequency = 1.0 / params.scale;
    let mut amplitude = 1.0;
    let mut max_amplitude = 0.0;

    for _ in 0..params.octaves {
        let n = noise.get([x * frequency, offset, z * frequency]);
        total += shape(n) * amplitude;
        max_amplitude += amplitude;

        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }

    if max_amplitude == 0.0 {
        return 0.0;
    }
    total / max_amplitude
}

/// Standard fBm. Range ≈ `[-1, 1]`.
pub fn fbm<N>(noise: &N, x: f64, z: f64, params: &FractalParams) -> f64
where
    N: NoiseFn<f64, 3> + ?Sized,
{
    accumulate(noise, x, z, params, salt::seed_offset(params.seed), |n| n)
}

/// Ridged fBm: `(1 - |n|)²` per octave. Range `[0, 1]`, ridges at 1.
pub fn ridged_fbm<N>(noise: &N, x: f64, z: f64, params: &FractalParams) -> f64
where
    N: NoiseFn<f64, 3> + ?Sized,
{
    let offset = salt::seed_offset(params.seed + salt::RIDGED);
    accumulate(noise, x, z, params, offset, |n| {
        let r = 1.0 - n.abs();
        r * r
    })
}

/// Billow fBm: `2|n| - 1` per octave. Range ≈ `[-1, 1]`, rounded crests.
pub fn billow_fbm<N>(noise: &N, x: f64, z: f64, params: &FractalParams) -> f64
where
    N: NoiseFn<f64, 3> + ?Sized,
{
    let offset = salt::seed_offset(params.seed + salt::BILLOW);
    accumulate(noise, x, z, params, offset, |n| 2.0 * n.abs() - 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
