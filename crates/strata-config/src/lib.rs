//! Configuration system for strata.
//!
//! Holds the [`TerrainParameters`] record consumed by every terrain sampling
//! path, plus application settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;
mod params;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, PreviewConfig, VoxelConfig, default_config_dir};
pub use error::ConfigError;
pub use params::{BiomeToggles, ClimateParams, GenerationType, TerrainParameters, Topology, ViewMode};
