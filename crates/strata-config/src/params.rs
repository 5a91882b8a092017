//! Terrain generation parameters shared by every sampling path.
//!
//! A [`TerrainParameters`] value is immutable for the duration of one
//! regeneration. The preview mesh, the voxel batch writer and the emitted
//! host script all read the same record, so identical parameters yield the
//! same world shape and biome layout on every consumer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Macro-scale landform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Topology {
    /// Continental noise with clustered tectonic mountain chains.
    Standard,
    /// Fault-chain dominated mountain ranges.
    #[default]
    Alpine,
    /// Stepped plateaus cut by ridged valleys.
    Canyons,
    /// Billowed, low-relief sand seas.
    Dunes,
}

/// World-shape mask applied after the topology pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GenerationType {
    /// No mask; terrain extends past the map edge.
    #[default]
    Infinite,
    /// A single landmass fading to sea floor near the map edge.
    Island,
    /// Noise-placed island clusters inside a circular bound.
    Archipelago,
}

/// Colorization mode of the preview. Debug modes never change geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Full biome coloring with rock overlay and dither.
    #[default]
    Standard,
    /// Fault-chain intensity heat map.
    Tectonics,
    /// Blue (cold) to red (hot).
    Temperature,
    /// Yellow (dry) to blue (wet).
    Humidity,
    /// Grayscale normalized height.
    Height,
}

macro_rules! named_enum {
    ($ty:ident, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Canonical name used in config files and on the command line.
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(s))
                    .ok_or_else(|| ConfigError::UnrecognizedVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

named_enum!(Topology, "topology", [Standard, Alpine, Canyons, Dunes]);
named_enum!(GenerationType, "generation type", [Infinite, Island, Archipelago]);
named_enum!(ViewMode, "view mode", [Standard, Tectonics, Temperature, Humidity, Height]);

/// Temperature and humidity field knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClimateParams {
    /// Feature size of the temperature field, in world units.
    pub temperature_scale: f64,
    /// Added to the normalized base temperature.
    pub temperature_offset: f64,
    /// Temperature lost per world unit of height above zero.
    pub temperature_lapse_rate: f64,
    /// Feature size of the humidity field, in world units.
    pub humidity_scale: f64,
    /// Added to the normalized base humidity.
    pub humidity_offset: f64,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            temperature_scale: 3000.0,
            temperature_offset: 0.0,
            temperature_lapse_rate: 0.0008,
            humidity_scale: 3000.0,
            humidity_offset: 0.0,
        }
    }
}

/// Per-biome enable switches. Each is checked at one fixed point of the
/// classification tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BiomeToggles {
    pub snow: bool,
    pub desert: bool,
    pub forest: bool,
    pub rock: bool,
    pub water: bool,
    pub mesa: bool,
    pub volcano: bool,
    pub coral: bool,
}

impl BiomeToggles {
    /// Every biome switched off.
    pub const NONE: Self = Self {
        snow: false,
        desert: false,
        forest: false,
        rock: false,
        water: false,
        mesa: false,
        volcano: false,
        coral: false,
    };
}

impl Default for BiomeToggles {
    fn default() -> Self {
        Self {
            snow: true,
            desert: true,
            forest: true,
            rock: true,
            water: true,
            mesa: true,
            volcano: true,
            coral: true,
        }
    }
}

/// Full parameter record for one terrain evaluation.
///
/// No bounds validation happens here: a zero `scale` or `map_size` produces
/// degenerate output rather than an error, so callers constrain the ranges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainParameters {
    /// World seed. Only ever used as a noise-space coordinate offset.
    pub seed: i64,
    /// Base feature size in world units.
    pub scale: f64,
    /// World units per unit of normalized height.
    pub height_scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Sea level as a fraction of `height_scale`.
    pub water_level: f64,
    /// Side length of the generated square, centered on the origin.
    pub map_size: f64,
    /// Preview mesh subdivisions per side.
    pub resolution: u32,
    pub topology: Topology,
    pub generation_type: GenerationType,
    /// 0 = young and jagged, 1 = old and rounded.
    pub terrain_age: f64,
    pub ridge_noise_strength: f64,
    pub peak_roughness: f64,
    /// Terrace quantization steps; 0 disables terracing.
    pub terrace_steps: u32,
    /// Detail noise frequency; 0 disables the detail pass.
    pub detail_strand_frequency: f64,
    pub erosion_strength: f64,
    /// River carving depth in normalized height; 0 disables rivers.
    pub river_depth: f64,
    /// Exponent applied to normalized height.
    pub exaggeration: f64,
    pub climate: ClimateParams,
    pub biomes: BiomeToggles,
    /// Preview colorization only.
    pub view_mode: ViewMode,
}

impl Default for TerrainParameters {
    fn default() -> Self {
        Self {
            seed: 8888,
            scale: 1800.0,
            height_scale: 900.0,
            octaves: 8,
            persistence: 0.45,
            lacunarity: 2.0,
            water_level: 0.2,
            map_size: 4096.0,
            resolution: 512,
            topology: Topology::Alpine,
            generation_type: GenerationType::Infinite,
            terrain_age: 0.2,
            ridge_noise_strength: 0.8,
            peak_roughness: 0.6,
            terrace_steps: 0,
            detail_strand_frequency: 50.0,
            erosion_strength: 1.0,
            river_depth: 1.0,
            exaggeration: 1.2,
            climate: ClimateParams::default(),
            biomes: BiomeToggles::default(),
            view_mode: ViewMode::Standard,
        }
    }
}

impl TerrainParameters {
    /// Absolute sea level in world units.
    pub fn water_height(&self) -> f64 {
        self.water_level * self.height_scale
    }

    /// Half the map side length.
    pub fn half_extent(&self) -> f64 {
        self.map_size * 0.5
    }
}
