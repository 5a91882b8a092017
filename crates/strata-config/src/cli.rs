//! Command-line argument parsing for strata.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::error::ConfigError;
use crate::params::{GenerationType, Topology, ViewMode};

/// Global strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default, Clone)]
pub struct CliArgs {
    /// World seed.
    #[arg(long, global = true)]
    pub seed: Option<i64>,

    /// Topology (Standard, Alpine, Canyons, Dunes).
    #[arg(long, global = true)]
    pub topology: Option<String>,

    /// World shape (Infinite, Island, Archipelago).
    #[arg(long, global = true)]
    pub generation_type: Option<String>,

    /// Map side length in world units.
    #[arg(long, global = true)]
    pub map_size: Option<f64>,

    /// Preview mesh subdivisions per side.
    #[arg(long, global = true)]
    pub resolution: Option<u32>,

    /// Preview view mode (Standard, Tectonics, Temperature, Humidity, Height).
    #[arg(long, global = true)]
    pub view_mode: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    ///
    /// Enumerated overrides are parsed strictly; an unknown name is an error
    /// and leaves the config untouched.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<(), ConfigError> {
        let topology: Option<Topology> = args.topology.as_deref().map(str::parse).transpose()?;
        let generation_type: Option<GenerationType> =
            args.generation_type.as_deref().map(str::parse).transpose()?;
        let view_mode: Option<ViewMode> = args.view_mode.as_deref().map(str::parse).transpose()?;

        let terrain = &mut self.terrain;
        if let Some(seed) = args.seed {
            terrain.seed = seed;
        }
        if let Some(topology) = topology {
            terrain.topology = topology;
        }
        if let Some(generation_type) = generation_type {
            terrain.generation_type = generation_type;
        }
        if let Some(size) = args.map_size {
            terrain.map_size = size;
        }
        if let Some(res) = args.resolution {
            terrain.resolution = res;
        }
        if let Some(view_mode) = view_mode {
            terrain.view_mode = view_mode;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        Ok(())
    }
}
