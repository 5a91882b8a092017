//! Temperature and humidity fields.
//!
//! Both fields use their own fixed fractal settings so that changing the
//! terrain's octaves or persistence never shifts the climate bands.

use noise::NoiseFn;
use strata_config::{ClimateParams, TerrainParameters};

use crate::field::PerlinField;
use crate::fractal::{FractalParams, fbm};
use crate::salt;

/// Octaves of both climate fields.
pub const CLIMATE_OCTAVES: u32 = 3;
/// Humidity gained per world unit of altitude.
pub const ALTITUDE_WETNESS: f64 = 0.0002;

/// Climate at one surface point. Both values lie in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClimateResult {
    pub temperature: f64,
    pub humidity: f64,
}

/// Noise-driven climate with an altitude lapse rate.
#[derive(Clone, Debug)]
pub struct ClimateModel<N = PerlinField> {
    noise: N,
    climate: ClimateParams,
    temperature: FractalParams,
    humidity: FractalParams,
}

impl ClimateModel<PerlinField> {
    pub fn new(params: &TerrainParameters) -> Self {
        Self::with_noise(PerlinField, params)
    }
}

impl<N: NoiseFn<f64, 3>> ClimateModel<N> {
    pub fn with_noise(noise: N, params: &TerrainParameters) -> Self {
        let climate = params.climate.clone();
        let fixed = FractalParams {
            seed: params.seed,
            scale: 1.0,
            octaves: CLIMATE_OCTAVES,
            persistence: 0.5,
            lacunarity: 2.0,
        };
        Self {
            noise,
            temperature: fixed
                .with_seed(params.seed + salt::TEMPERATURE)
                .with_scale(climate.temperature_scale),
            humidity: fixed
                .with_seed(params.seed + salt::HUMIDITY)
                .with_scale(climate.humidity_scale),
            climate,
        }
    }

    /// Climate at `(x, z)` for a surface at `height`.
    ///
    /// Only altitude above zero cools or wets the air.
    pub fn sample(&self, x: f64, z: f64, height: f64) -> ClimateResult {
        let altitude = height.max(0.0);

        let base_temp = (fbm(&self.noise, x, z, &self.temperature) + 1.0) / 2.0;
        let temperature = base_temp + self.climate.temperature_offset
            - altitude * self.climate.temperature_lapse_rate;

        let base_humid = (fbm(&self.noise, x, z, &self.humidity) + 1.0) / 2.0;
        let humidity = base_humid + self.climate.humidity_offset + altitude * ALTITUDE_WETNESS;

        ClimateResult {
            temperature: temperature.clamp(0.0, 1.0),
            humidity: humidity.clamp(0.0, 1.0),
        }
    }
}
