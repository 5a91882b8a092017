//! Luau program generator for an external voxel-terrain host.
//!
//! The emitted script re-derives height, biome material and occupancy inside
//! the host with its native noise, rather than replaying values computed
//! here. A generated header binds every parameter, salt and threshold from
//! the Rust constants; the fixed algorithm body follows it.

use std::fmt::{Display, Write};

use strata_config::TerrainParameters;

use crate::biome::classify as biome;
use crate::climate::{ALTITUDE_WETNESS, CLIMATE_OCTAVES};
use crate::height::{CANYON_STEPS, DETAIL_MIN_HEIGHT, SEA_FLOOR, TERRACE_BLEND};
use crate::salt;
use crate::tectonic::{OLD_EXPONENT, YOUNG_AGE, YOUNG_EXPONENT};
use crate::voxel_writer::{BOTTOM_MARGIN, SURFACE_SKIRT, TOP_MARGIN, VoxelWriterConfig};

const BODY: &str = include_str!("script/generator.luau");

/// Workspace attribute the host sets to `true` to stop between batches.
pub const CANCEL_ATTRIBUTE: &str = "StrataCancel";

struct Header {
    out: String,
}

impl Header {
    fn section(&mut self, title: &str) {
        let _ = writeln!(self.out, "\n-- // {title} //");
    }

    fn local(&mut self, name: &str, value: impl Display) {
        let _ = writeln!(self.out, "local {name} = {value}");
    }

    fn string(&mut self, name: &str, value: impl Display) {
        let _ = writeln!(self.out, "local {name} = \"{value}\"");
    }
}

/// Render the complete host script for `params`.
pub fn emit_luau_script(params: &TerrainParameters, voxel: &VoxelWriterConfig) -> String {
    let mut h = Header {
        out: String::from("-- Strata voxel terrain generator\n-- Generated script; edit the parameters, not the body.\n"),
    };
    let c = &params.climate;
    let b = &params.biomes;

    h.section("PARAMETERS");
    h.local("SEED", params.seed);
    h.local("SCALE", params.scale);
    h.local("HEIGHT_SCALE", params.height_scale);
    h.local("OCTAVES", params.octaves);
    h.local("PERSISTENCE", params.persistence);
    h.local("LACUNARITY", params.lacunarity);
    h.local("EXAGGERATION", params.exaggeration);
    h.local("RIDGE_STRENGTH", params.ridge_noise_strength);
    h.local("PEAK_ROUGHNESS", params.peak_roughness);
    h.local("TERRACE_STEPS", params.terrace_steps);
    h.string("GEN_TYPE", params.generation_type);
    h.string("TOPOLOGY", params.topology);
    h.local("AGE", params.terrain_age);
    h.local("DETAIL_FREQ", params.detail_strand_frequency * 0.05);
    h.local("EROSION_STRENGTH", params.erosion_strength);
    h.local("RIVER_DEPTH", params.river_depth);
    h.local("MAP_SIZE", params.map_size);
    h.local("WATER_HEIGHT", params.water_height());

    h.section("CLIMATE");
    h.local("TEMP_SCALE", c.temperature_scale);
    h.local("TEMP_OFFSET", c.temperature_offset);
    h.local("TEMP_LAPSE", c.temperature_lapse_rate);
    h.local("HUMID_SCALE", c.humidity_scale);
    h.local("HUMID_OFFSET", c.humidity_offset);
    h.local("CLIMATE_OCTAVES", CLIMATE_OCTAVES);
    h.local("ALTITUDE_WETNESS", ALTITUDE_WETNESS);

    h.section("TOGGLES");
    h.local("ENABLE_SNOW", b.snow);
    h.local("ENABLE_DESERT", b.desert);
    h.local("ENABLE_FOREST", b.forest);
    h.local("ENABLE_ROCK", b.rock);
    h.local("ENABLE_WATER", b.water);
    h.local("ENABLE_MESA", b.mesa);
    h.local("ENABLE_VOLCANO", b.volcano);
    h.local("ENABLE_CORAL", b.coral);

    h.section("NOISE STREAMS");
    h.local("SEED_SPACING", salt::SEED_SPACING);
    h.local("SALT_RIDGED", salt::RIDGED);
    h.local("SALT_BILLOW", salt::BILLOW);
    h.local("SALT_CHAIN_MASK", salt::CHAIN_MASK);
    h.local("SALT_FAULT_WARP_X", salt::FAULT_WARP_X);
    h.local("SALT_FAULT_WARP_Z", salt::FAULT_WARP_Z);
    h.local("SALT_VOLCANO", salt::VOLCANO);
    h.local("SALT_CORAL", salt::CORAL);
    h.local("SALT_RIVER", salt::RIVER);
    h.local("SALT_TEMPERATURE", salt::TEMPERATURE);
    h.local("SALT_HUMIDITY", salt::HUMIDITY);
    h.local("SALT_LAVA", salt::LAVA);

    h.section("SHAPE");
    h.local("YOUNG_AGE", YOUNG_AGE);
    h.local("YOUNG_EXPONENT", YOUNG_EXPONENT);
    h.local("OLD_EXPONENT", OLD_EXPONENT);
    h.local("SEA_FLOOR", SEA_FLOOR);
    h.local("CANYON_STEPS", CANYON_STEPS);
    h.local("TERRACE_BLEND", TERRACE_BLEND);
    h.local("DETAIL_MIN_HEIGHT", DETAIL_MIN_HEIGHT);

    h.section("BIOMES");
    h.local("RIVERBED_MARGIN", biome::RIVERBED_MARGIN);
    h.local("CORAL_MAX_DEPTH", biome::CORAL_MAX_DEPTH);
    h.local("CORAL_MIN_TEMPERATURE", biome::CORAL_MIN_TEMPERATURE);
    h.local("CORAL_GATE", biome::CORAL_GATE);
    h.local("CORAL_NOISE_SCALE", biome::CORAL_NOISE_SCALE);
    h.local("CLIFF_BASE_SLOPE", biome::CLIFF_BASE_SLOPE);
    h.local("CLIFF_AGE_SLOPE", biome::CLIFF_AGE_SLOPE);
    h.local("VOLCANO_NOISE_SCALE", biome::VOLCANO_NOISE_SCALE);
    h.local("VOLCANO_GATE", biome::VOLCANO_GATE);
    h.local("VOLCANO_MIN_ELEVATION", biome::VOLCANO_MIN_ELEVATION);
    h.local("LAVA_MIN_ELEVATION", biome::LAVA_MIN_ELEVATION);
    h.local("LAVA_MAX_SLOPE", biome::LAVA_MAX_SLOPE);
    h.local("LAVA_NOISE_SCALE", biome::LAVA_NOISE_SCALE);
    h.local("LAVA_GATE", biome::LAVA_GATE);
    h.local("FROZEN_BELOW", biome::FROZEN_BELOW);
    h.local("COLD_BELOW", biome::COLD_BELOW);
    h.local("TEMPERATE_BELOW", biome::TEMPERATE_BELOW);
    h.local("SNOW_ROCK_SLOPE", biome::SNOW_ROCK_SLOPE);
    h.local("GLACIER_HUMIDITY", biome::GLACIER_HUMIDITY);
    h.local("TAIGA_HUMIDITY", biome::TAIGA_HUMIDITY);
    h.local("WET_HUMIDITY", biome::WET_HUMIDITY);
    h.local("SWAMP_MARGIN", biome::SWAMP_MARGIN);
    h.local("ARID_HUMIDITY", biome::ARID_HUMIDITY);
    h.local("MESA_HUMIDITY", biome::MESA_HUMIDITY);
    h.local("SAVANNAH_HUMIDITY", biome::SAVANNAH_HUMIDITY);

    h.section("BATCHES");
    h.local("BATCH_SIZE_VOXELS", voxel.batch_size_voxels);
    h.local("VOXEL_RES", voxel.voxel_resolution);
    h.local("YIELD_EVERY", voxel.yield_every_batches.max(1));
    h.local("FILL_DEPTH", voxel.underground_fill_depth);
    h.local("BOTTOM_MARGIN", BOTTOM_MARGIN);
    h.local("TOP_MARGIN", TOP_MARGIN);
    h.local("SURFACE_SKIRT", SURFACE_SKIRT);
    h.string("CANCEL_ATTRIBUTE", CANCEL_ATTRIBUTE);

    let mut script = h.out;
    script.push('\n');
    script.push_str(BODY);
    script
}
