//! Continuous preview coloring and the debug view ramps.

use noise::NoiseFn;
use strata_config::{BiomeToggles, TerrainParameters, ViewMode};

use super::classify::{Biome, FROZEN_BELOW, SurfaceSample, cliff_threshold};
use super::palette::{self, Color};
use crate::field::PerlinField;
use crate::salt::smoothstep;

/// Height band above sea level that gets beach or mud blending.
pub const SHORE_BAND: f64 = 8.0;
pub const SHORE_MAX_SLOPE: f64 = 0.5;
pub const SHORE_MIN_TEMPERATURE: f64 = 0.3;
/// Width of the slope ramp that fades into bare rock.
pub const ROCK_RAMP: f64 = 0.7;
/// Frozen slopes steeper than this show rock outright.
pub const FROZEN_ROCK_SLOPE: f64 = 1.5;
pub const DITHER_FREQUENCY: f64 = 0.3;
pub const DITHER_AMPLITUDE: f64 = 0.05;

/// Colors surface points for one parameter set and view mode.
#[derive(Clone, Debug)]
pub struct SurfaceShader<N = PerlinField> {
    noise: N,
    seed: i64,
    height_scale: f64,
    water_height: f64,
    age: f64,
    toggles: BiomeToggles,
    view_mode: ViewMode,
}

impl SurfaceShader<PerlinField> {
    pub fn new(params: &TerrainParameters) -> Self {
        Self::with_noise(PerlinField, params)
    }
}

impl<N: NoiseFn<f64, 3>> SurfaceShader<N> {
    pub fn with_noise(noise: N, params: &TerrainParameters) -> Self {
        Self {
            noise,
            seed: params.seed,
            height_scale: params.height_scale,
            water_height: params.water_height(),
            age: params.terrain_age,
            toggles: params.biomes,
            view_mode: params.view_mode,
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Color for a classified surface point in the configured view.
    ///
    /// `tectonic_activity` is read only by the tectonics view.
    pub fn shade(&self, s: &SurfaceSample, biome: Biome, tectonic_activity: f64) -> Color {
        match self.view_mode {
            ViewMode::Height => height_color(s.height, self.height_scale),
            ViewMode::Tectonics => tectonic_color(tectonic_activity, s.height, self.height_scale),
            ViewMode::Temperature => temperature_color(s.climate.temperature),
            ViewMode::Humidity => humidity_color(s.climate.humidity),
            ViewMode::Standard => self.standard(s, biome),
        }
    }

    fn standard(&self, s: &SurfaceSample, biome: Biome) -> Color {
        let t = &self.toggles;
        let temp = s.climate.temperature;
        let dither = self.dither(s.x, s.z);

        let mut color = biome.base_color();

        if !biome.is_submerged()
            && !biome.is_volcanic()
            && t.water
            && s.height < self.water_height + SHORE_BAND
            && s.slope < SHORE_MAX_SLOPE
            && temp > SHORE_MIN_TEMPERATURE
        {
            let blend = 1.0 - ((s.height - self.water_height) / SHORE_BAND).min(1.0);
            color = if t.desert {
                color.lerp(palette::BEACH, blend as f32)
            } else {
                color.lerp(palette::MUD, (blend * 0.5) as f32)
            };
        }

        let threshold = cliff_threshold(self.age);
        let mut rock = if t.rock {
            smoothstep(threshold - ROCK_RAMP, threshold, s.slope)
        } else {
            0.0
        };
        if temp < FROZEN_BELOW && t.snow {
            rock = if s.slope > FROZEN_ROCK_SLOPE { 1.0 } else { 0.0 };
        }
        if biome.is_volcanic() {
            rock = 0.0;
        }

        let mut rock_color = palette::ROCK;
        if rock > 0.1 && t.rock {
            rock_color = rock_color
                .lerp(palette::ROCK_DARK, 0.2)
                .add_scalar((dither * 0.5) as f32);
        }

        color.lerp(rock_color, rock as f32).add_scalar((dither * 0.5) as f32)
    }

    /// Fine brightness jitter at `(x, z)`.
    pub fn dither(&self, x: f64, z: f64) -> f64 {
        self.noise
            .get([x * DITHER_FREQUENCY, self.seed as f64, z * DITHER_FREQUENCY])
            * DITHER_AMPLITUDE
    }
}

/// Grayscale by normalized height.
pub fn height_color(height: f64, height_scale: f64) -> Color {
    let norm = (height / height_scale).clamp(0.0, 1.0);
    Color::from_hsl(0.0, 0.0, norm as f32)
}

/// Stepped stress ramp lifted slightly by height.
pub fn tectonic_color(activity: f64, height: f64, height_scale: f64) -> Color {
    let base = if activity < 0.2 {
        palette::STRESS_NONE
    } else if activity < 0.5 {
        palette::STRESS_LOW
    } else if activity < 0.8 {
        palette::STRESS_HIGH
    } else {
        palette::STRESS_PEAK
    };
    let norm = (height / height_scale).clamp(0.0, 1.0);
    base.add_scalar((norm * 0.1) as f32)
}

/// Blue for cold through red for hot.
pub fn temperature_color(temperature: f64) -> Color {
    Color::from_hsl(((1.0 - temperature) * 0.7) as f32, 1.0, 0.5)
}

/// Yellow for dry through blue for wet.
pub fn humidity_color(humidity: f64) -> Color {
    Color::from_hsl((0.16 + humidity * 0.44) as f32, 1.0, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::ClimateResult;

    fn sample(height: f64, slope: f64, temperature: f64) -> SurfaceSample {
        SurfaceSample {
            x: 3.0,
            z: 4.0,
            height,
            slope,
            is_river: false,
            climate: ClimateResult {
                temperature,
                humidity: 0.5,
            },
        }
    }

    fn close(a: Color, b: Color, eps: f32) -> bool {
        (a.r - b.r).abs() < eps && (a.g - b.g).abs() < eps && (a.b - b.b).abs() < eps
    }

    #[test]
    fn test_height_view_is_grayscale() {
        assert_eq!(height_color(-50.0, 900.0), Color::new(0.0, 0.0, 0.0));
        assert_eq!(height_color(2000.0, 900.0), Color::new(1.0, 1.0, 1.0));
        let mid = height_color(450.0, 900.0);
        assert!(mid.r == mid.g && mid.g == mid.b);
        assert!((mid.r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tectonic_ramp_steps() {
        assert_eq!(tectonic_color(0.1, 0.0, 900.0), palette::STRESS_NONE);
        assert_eq!(tectonic_color(0.3, 0.0, 900.0), palette::STRESS_LOW);
        assert_eq!(tectonic_color(0.6, 0.0, 900.0), palette::STRESS_HIGH);
        assert_eq!(tectonic_color(0.95, 0.0, 900.0), palette::STRESS_PEAK);
        let lifted = tectonic_color(0.1, 900.0, 900.0);
        assert!(close(lifted, palette::STRESS_NONE.add_scalar(0.1), 1e-6));
    }

    #[test]
    fn test_climate_views_hue_ends() {
        assert!(close(temperature_color(1.0), Color::new(1.0, 0.0, 0.0), 1e-5));
        let cold = temperature_color(0.0);
        assert!(cold.b > cold.r && cold.b > cold.g, "cold should be blue: {cold:?}");
        let dry = humidity_color(0.0);
        assert!(dry.r > 0.9 && dry.g > 0.9 && dry.b < 0.1, "dry should be yellow: {dry:?}");
        let wet = humidity_color(1.0);
        assert!(wet.b > wet.r, "wet should lean blue: {wet:?}");
    }

    #[test]
    fn test_flat_standard_color_is_base_plus_dither() {
        let params = TerrainParameters::default();
        let shader = SurfaceShader::new(&params);
        let s = sample(500.0, 0.0, 0.6);
        let dither = shader.dither(s.x, s.z) * 0.5;
        let color = shader.shade(&s, Biome::Forest, 0.0);
        assert!(close(color, palette::FOREST.add_scalar(dither as f32), 1e-6));
    }

    #[test]
    fn test_shoreline_blends_toward_beach() {
        let params = TerrainParameters::default();
        let shader = SurfaceShader::new(&params);
        let water = params.water_height();
        let at_water = shader.shade(&sample(water, 0.0, 0.6), Biome::Grassland, 0.0);
        let dither = shader.dither(3.0, 4.0) * 0.5;
        assert!(close(at_water, palette::BEACH.add_scalar(dither as f32), 1e-5));

        let inland = shader.shade(&sample(water + 20.0, 0.0, 0.6), Biome::Grassland, 0.0);
        assert!(close(inland, palette::GRASS_LUSH.add_scalar(dither as f32), 1e-5));
    }

    #[test]
    fn test_steep_slopes_turn_to_rock() {
        let params = TerrainParameters::default();
        let shader = SurfaceShader::new(&params);
        let steep = shader.shade(&sample(500.0, 5.0, 0.6), Biome::Grassland, 0.0);
        let dither = (shader.dither(3.0, 4.0) * 0.5) as f32;
        let rock = palette::ROCK.lerp(palette::ROCK_DARK, 0.2).add_scalar(dither).add_scalar(dither);
        assert!(close(steep, rock, 1e-5), "{steep:?} vs {rock:?}");
    }

    #[test]
    fn test_volcanic_biomes_skip_rock_overlay() {
        let params = TerrainParameters::default();
        let shader = SurfaceShader::new(&params);
        let dither = (shader.dither(3.0, 4.0) * 0.5) as f32;
        let lava = shader.shade(&sample(800.0, 5.0, 0.6), Biome::Lava, 0.0);
        assert!(close(lava, palette::LAVA.add_scalar(dither), 1e-5));
    }

    #[test]
    fn test_frozen_band_rock_is_binary() {
        let params = TerrainParameters::default();
        let shader = SurfaceShader::new(&params);
        let dither = (shader.dither(3.0, 4.0) * 0.5) as f32;
        // 1.4 is past the cliff ramp, yet frozen ground stays clean below 1.5
        let gentle = shader.shade(&sample(800.0, 1.4, 0.1), Biome::Snow, 0.0);
        assert!(close(gentle, palette::SNOW.add_scalar(dither), 1e-5));

        let steep = shader.shade(&sample(800.0, FROZEN_ROCK_SLOPE + 0.1, 0.1), Biome::Snow, 0.0);
        let rock = palette::ROCK.lerp(palette::ROCK_DARK, 0.2).add_scalar(dither).add_scalar(dither);
        assert!(close(steep, rock, 1e-5), "steep frozen slope should be bare rock: {steep:?} vs {rock:?}");

        let snowless = SurfaceShader::new(&TerrainParameters {
            biomes: BiomeToggles {
                snow: false,
                ..Default::default()
            },
            ..Default::default()
        });
        let ramped = snowless.shade(&sample(800.0, 1.4, 0.1), Biome::Snow, 0.0);
        assert!(close(ramped, rock, 1e-5), "without snow the cliff ramp applies: {ramped:?}");
    }

    #[test]
    fn test_debug_views_ignore_biome() {
        let params = TerrainParameters {
            view_mode: ViewMode::Humidity,
            ..Default::default()
        };
        let shader = SurfaceShader::new(&params);
        let s = sample(100.0, 0.2, 0.5);
        assert_eq!(shader.shade(&s, Biome::Desert, 0.0), shader.shade(&s, Biome::Jungle, 0.0));
    }
}
