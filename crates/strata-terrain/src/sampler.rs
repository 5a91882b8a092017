//! Full surface evaluation: height, slope, climate, biome and color for a
//! single world coordinate.

use noise::NoiseFn;
use strata_config::TerrainParameters;

use crate::biome::{Biome, BiomeClassifier, Color, SurfaceSample, SurfaceShader};
use crate::climate::{ClimateModel, ClimateResult};
use crate::field::PerlinField;
use crate::height::HeightSynthesizer;
use crate::salt::det_sqrt;

/// Offset of the forward-difference slope probe.
pub const SLOPE_PROBE: f64 = 1.0;

/// Everything known about one surface coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub sample: SurfaceSample,
    pub biome: Biome,
    pub tectonic_activity: f64,
}

/// Bundles the per-stage evaluators for one parameter set.
#[derive(Clone, Debug)]
pub struct TerrainSampler<N = PerlinField> {
    height: HeightSynthesizer<N>,
    climate: ClimateModel<N>,
    classifier: BiomeClassifier<N>,
    shader: SurfaceShader<N>,
}

impl TerrainSampler<PerlinField> {
    pub fn new(params: TerrainParameters) -> Self {
        Self::with_noise(PerlinField, params)
    }
}

impl<N: NoiseFn<f64, 3> + Clone> TerrainSampler<N> {
    pub fn with_noise(noise: N, params: TerrainParameters) -> Self {
        Self {
            climate: ClimateModel::with_noise(noise.clone(), &params),
            classifier: BiomeClassifier::with_noise(noise.clone(), &params),
            shader: SurfaceShader::with_noise(noise.clone(), &params),
            height: HeightSynthesizer::with_noise(noise, params),
        }
    }

    pub fn params(&self) -> &TerrainParameters {
        self.height.params()
    }

    pub fn heights(&self) -> &HeightSynthesizer<N> {
        &self.height
    }

    pub fn climate(&self) -> &ClimateModel<N> {
        &self.climate
    }

    pub fn classifier(&self) -> &BiomeClassifier<N> {
        &self.classifier
    }

    pub fn height(&self, x: f64, z: f64) -> f64 {
        self.height.height(x, z)
    }

    /// Forward-difference slope magnitude at a point whose height is known.
    pub fn slope(&self, x: f64, z: f64, height: f64) -> f64 {
        let dx = (self.height.height(x + SLOPE_PROBE, z) - height) / SLOPE_PROBE;
        let dz = (self.height.height(x, z + SLOPE_PROBE) - height) / SLOPE_PROBE;
        det_sqrt(dx * dx + dz * dz)
    }

    /// Evaluate every stage at `(x, z)`.
    pub fn surface(&self, x: f64, z: f64) -> SurfacePoint {
        let result = self.height.sample(x, z);
        let slope = self.slope(x, z, result.height);
        let climate: ClimateResult = self.climate.sample(x, z, result.height);
        let sample = SurfaceSample {
            x,
            z,
            height: result.height,
            slope,
            is_river: result.is_river,
            climate,
        };
        SurfacePoint {
            biome: self.classifier.classify(&sample),
            sample,
            tectonic_activity: result.tectonic_activity,
        }
    }

    /// Preview color of a surface point in the configured view.
    pub fn color(&self, point: &SurfacePoint) -> Color {
        self.shader.shade(&point.sample, point.biome, point.tectonic_activity)
    }
}
