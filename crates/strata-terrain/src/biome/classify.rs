//! The biome decision tree.
//!
//! Branches are tested in a fixed priority order and the first match wins.
//! Each enable toggle is consulted only at its own branch, so a disabled
//! biome falls through to whatever the tree reaches next.

use noise::NoiseFn;
use strata_config::{BiomeToggles, TerrainParameters};
use strata_voxel::Material;

use super::palette::{self, Color};
use crate::climate::ClimateResult;
use crate::field::PerlinField;
use crate::salt::{self, det_sin};

// Underwater
/// River channels within this height above sea level become riverbed.
pub const RIVERBED_MARGIN: f64 = 5.0;
pub const CORAL_MAX_DEPTH: f64 = 25.0;
pub const CORAL_MIN_TEMPERATURE: f64 = 0.6;
pub const CORAL_GATE: f64 = 0.2;
pub const CORAL_PINK_GATE: f64 = 0.5;
pub const CORAL_NOISE_SCALE: f64 = 20.0;
pub const SEABED_ROCK_SLOPE: f64 = 0.8;
pub const SHALLOW_SEABED_DEPTH: f64 = 15.0;

// Rock and volcanism
pub const CLIFF_BASE_SLOPE: f64 = 1.2;
pub const CLIFF_AGE_SLOPE: f64 = 0.4;
pub const VOLCANO_NOISE_SCALE: f64 = 1000.0;
pub const VOLCANO_GATE: f64 = 0.6;
pub const VOLCANO_MIN_ELEVATION: f64 = 0.25;
pub const LAVA_MIN_ELEVATION: f64 = 0.7;
pub const LAVA_MAX_SLOPE: f64 = 1.0;
pub const LAVA_NOISE_SCALE: f64 = 50.0;
pub const LAVA_GATE: f64 = 0.4;

// Climate bands
pub const FROZEN_BELOW: f64 = 0.25;
pub const COLD_BELOW: f64 = 0.45;
pub const TEMPERATE_BELOW: f64 = 0.75;
pub const SNOW_ROCK_SLOPE: f64 = 0.9;
pub const GLACIER_HUMIDITY: f64 = 0.6;
pub const TAIGA_HUMIDITY: f64 = 0.5;
pub const DRY_GRASS_HUMIDITY: f64 = 0.3;
pub const WET_HUMIDITY: f64 = 0.6;
/// Temperate forest this close above sea level turns to swamp.
pub const SWAMP_MARGIN: f64 = 20.0;
pub const ARID_HUMIDITY: f64 = 0.35;
pub const MESA_HUMIDITY: f64 = 0.25;
pub const SAVANNAH_HUMIDITY: f64 = 0.6;

/// Slope at which steep faces become bare rock for this terrain age.
pub fn cliff_threshold(age: f64) -> f64 {
    CLIFF_BASE_SLOPE + age * CLIFF_AGE_SLOPE
}

/// Sandstone stripe of a mesa wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MesaBand {
    Red,
    Orange,
    Brown,
}

/// Outcome of the decision tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    /// Shallow river channel floor.
    Riverbed,
    /// Warm shallow coral; `pink` picks the reef tint.
    Reef { pink: bool },
    /// Steep submerged slope.
    SeabedRock,
    ShallowSeabed,
    DeepSeabed,
    /// Slope too steep to hold anything but rock.
    Cliff,
    Volcanic,
    Lava,
    /// Exposed rock in the frozen band.
    FrozenRock,
    Ice,
    Snow,
    Taiga,
    Tundra,
    DryGrass,
    Swamp,
    Forest,
    Grassland,
    Mesa(MesaBand),
    Desert,
    Scrubland,
    Savannah,
    Jungle,
}

impl Biome {
    /// Discrete voxel material for this biome.
    pub fn material(self) -> Material {
        match self {
            Biome::Reef { .. } => Material::Limestone,
            Biome::Riverbed
            | Biome::SeabedRock
            | Biome::ShallowSeabed
            | Biome::DeepSeabed
            | Biome::Swamp => Material::Mud,
            Biome::Cliff | Biome::FrozenRock | Biome::Mesa(MesaBand::Brown) => Material::Rock,
            Biome::Volcanic => Material::Basalt,
            Biome::Lava => Material::CrackedLava,
            Biome::Ice => Material::Glacier,
            Biome::Snow => Material::Snow,
            Biome::Taiga | Biome::Scrubland | Biome::Savannah => Material::Ground,
            Biome::Tundra | Biome::DryGrass | Biome::Grassland => Material::Grass,
            Biome::Forest | Biome::Jungle => Material::LeafyGrass,
            Biome::Mesa(_) => Material::Sandstone,
            Biome::Desert => Material::Sand,
        }
    }

    /// Flat preview color before slope, shoreline and dither adjustments.
    pub fn base_color(self) -> Color {
        match self {
            Biome::Riverbed | Biome::DeepSeabed => palette::MUD,
            Biome::Reef { pink: true } => palette::CORAL_PINK.lerp(palette::SAND, 0.3),
            Biome::Reef { pink: false } => palette::CORAL_GREEN.lerp(palette::SAND, 0.3),
            Biome::SeabedRock => palette::ROCK_DARK,
            Biome::ShallowSeabed | Biome::Desert => palette::SAND,
            Biome::Cliff => palette::ROCK,
            Biome::Volcanic => palette::VOLCANIC,
            Biome::Lava => palette::LAVA,
            Biome::FrozenRock => palette::ROCK_LIGHT,
            Biome::Ice => palette::ICE,
            Biome::Snow => palette::SNOW,
            Biome::Taiga => palette::TAIGA,
            Biome::Tundra => palette::GRASS_DRY.lerp(palette::ROCK_LIGHT, 0.5),
            Biome::DryGrass | Biome::Scrubland => palette::GRASS_DRY,
            Biome::Swamp => palette::SWAMP,
            Biome::Forest => palette::FOREST,
            Biome::Grassland => palette::GRASS_LUSH,
            Biome::Mesa(MesaBand::Red) => palette::MESA_RED,
            Biome::Mesa(MesaBand::Orange) => palette::MESA_ORANGE,
            Biome::Mesa(MesaBand::Brown) => palette::MESA_BROWN,
            Biome::Savannah => palette::SAVANNAH,
            Biome::Jungle => palette::JUNGLE,
        }
    }

    /// Underwater and river-floor biomes.
    pub fn is_submerged(self) -> bool {
        matches!(
            self,
            Biome::Riverbed
                | Biome::Reef { .. }
                | Biome::SeabedRock
                | Biome::ShallowSeabed
                | Biome::DeepSeabed
        )
    }

    /// Volcanic hotspot biomes, which never take a rock overlay.
    pub fn is_volcanic(self) -> bool {
        matches!(self, Biome::Volcanic | Biome::Lava)
    }
}

/// Everything the tree reads about one surface point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    pub x: f64,
    pub z: f64,
    pub height: f64,
    pub slope: f64,
    pub is_river: bool,
    pub climate: ClimateResult,
}

/// Runs the decision tree for one parameter set.
#[derive(Clone, Debug)]
pub struct BiomeClassifier<N = PerlinField> {
    noise: N,
    seed: i64,
    height_scale: f64,
    water_height: f64,
    age: f64,
    toggles: BiomeToggles,
}

impl BiomeClassifier<PerlinField> {
    pub fn new(params: &TerrainParameters) -> Self {
        Self::with_noise(PerlinField, params)
    }
}

impl<N: NoiseFn<f64, 3>> BiomeClassifier<N> {
    pub fn with_noise(noise: N, params: &TerrainParameters) -> Self {
        Self {
            noise,
            seed: params.seed,
            height_scale: params.height_scale,
            water_height: params.water_height(),
            age: params.terrain_age,
            toggles: params.biomes,
        }
    }

    /// Classify one surface point.
    pub fn classify(&self, s: &SurfaceSample) -> Biome {
        let t = &self.toggles;
        let water = self.water_height;

        if s.is_river && s.height < water + RIVERBED_MARGIN {
            return Biome::Riverbed;
        }
        if (t.water && s.height < water) || s.is_river {
            return self.underwater(s);
        }

        if t.rock && s.slope > cliff_threshold(self.age) {
            return Biome::Cliff;
        }

        if t.volcano
            && let Some(biome) = self.volcanic(s)
        {
            return biome;
        }

        let temp = s.climate.temperature;
        let hum = s.climate.humidity;

        if temp < FROZEN_BELOW {
            if !t.snow || (t.rock && s.slope > SNOW_ROCK_SLOPE) {
                Biome::FrozenRock
            } else if hum > GLACIER_HUMIDITY {
                Biome::Ice
            } else {
                Biome::Snow
            }
        } else if temp < COLD_BELOW {
            if hum > TAIGA_HUMIDITY && t.forest {
                Biome::Taiga
            } else {
                Biome::Tundra
            }
        } else if temp < TEMPERATE_BELOW {
            if hum < DRY_GRASS_HUMIDITY {
                if t.desert { Biome::DryGrass } else { Biome::Grassland }
            } else if hum > WET_HUMIDITY && t.forest {
                if s.height < water + SWAMP_MARGIN {
                    Biome::Swamp
                } else {
                    Biome::Forest
                }
            } else {
                Biome::Grassland
            }
        } else if hum < ARID_HUMIDITY {
            if t.mesa && hum < MESA_HUMIDITY {
                Biome::Mesa(self.mesa_band(s))
            } else if t.desert {
                Biome::Desert
            } else {
                Biome::Scrubland
            }
        } else if hum < SAVANNAH_HUMIDITY {
            Biome::Savannah
        } else if t.forest {
            Biome::Jungle
        } else {
            Biome::Grassland
        }
    }

    fn underwater(&self, s: &SurfaceSample) -> Biome {
        let depth = self.water_height - s.height;
        if self.toggles.coral && depth < CORAL_MAX_DEPTH && s.climate.temperature > CORAL_MIN_TEMPERATURE {
            let coral = self.noise.get([
                s.x / CORAL_NOISE_SCALE,
                (self.seed + salt::CORAL) as f64,
                s.z / CORAL_NOISE_SCALE,
            ]);
            if coral > CORAL_GATE {
                return Biome::Reef {
                    pink: coral > CORAL_PINK_GATE,
                };
            }
        }
        if self.toggles.rock && s.slope > SEABED_ROCK_SLOPE {
            Biome::SeabedRock
        } else if depth < SHALLOW_SEABED_DEPTH {
            Biome::ShallowSeabed
        } else {
            Biome::DeepSeabed
        }
    }

    fn volcanic(&self, s: &SurfaceSample) -> Option<Biome> {
        let hotspot = self.noise.get([
            s.x / VOLCANO_NOISE_SCALE,
            (self.seed + salt::VOLCANO) as f64,
            s.z / VOLCANO_NOISE_SCALE,
        ]);
        if hotspot <= VOLCANO_GATE || s.height <= self.height_scale * VOLCANO_MIN_ELEVATION {
            return None;
        }
        if s.height > self.height_scale * LAVA_MIN_ELEVATION && s.slope < LAVA_MAX_SLOPE {
            let lava = self.noise.get([
                s.x / LAVA_NOISE_SCALE,
                (self.seed + salt::LAVA) as f64,
                s.z / LAVA_NOISE_SCALE,
            ]);
            if lava > LAVA_GATE {
                return Some(Biome::Lava);
            }
        }
        Some(Biome::Volcanic)
    }

    fn mesa_band(&self, s: &SurfaceSample) -> MesaBand {
        let wobble = self.noise.get([s.x * 0.02, 0.0, s.z * 0.02]);
        let band = det_sin(s.height * 0.1 + wobble * 5.0);
        if band > 0.5 {
            MesaBand::Red
        } else if band > 0.0 {
            MesaBand::Orange
        } else {
            MesaBand::Brown
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
