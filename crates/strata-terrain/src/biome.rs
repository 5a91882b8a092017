//! Biome assignment: the classification tree, its palette, and the preview
//! shading built on top of it.

pub mod classify;
mod color;
mod palette;

pub use classify::{Biome, BiomeClassifier, MesaBand, SurfaceSample, cliff_threshold};
pub use color::{
    SurfaceShader, height_color, humidity_color, tectonic_color, temperature_color,
};
pub use palette::Color;
