//! Procedural terrain: seeded noise, fractal compositors, tectonic chains,
//! height synthesis, climate, biome classification, preview sampling and
//! batched voxel output.

mod climate;
mod fractal;
mod height;
mod job;
mod preview;
mod raster;
mod sampler;
mod tectonic;

pub mod biome;
pub mod field;
pub mod salt;
pub mod script;
pub mod voxel_writer;

pub use biome::{Biome, BiomeClassifier, Color, MesaBand, SurfaceSample, SurfaceShader};
pub use climate::{ClimateModel, ClimateResult};
pub use field::{HostNoise, PerlinField, perlin3};
pub use fractal::{FractalParams, billow_fbm, fbm, ridged_fbm};
pub use height::{HeightSynthesizer, SampleResult};
pub use job::{JobOutcome, VoxelJob, spawn_voxel_job, spawn_voxel_job_with_limit};
pub use preview::PreviewMesh;
pub use raster::{ImageExportError, PreviewImage, save_heightmap_png};
pub use sampler::{SurfacePoint, TerrainSampler};
pub use script::emit_luau_script;
pub use tectonic::{TectonicChain, tectonic_chain};
pub use voxel_writer::{
    CancellationToken, NoHooks, VoxelBatchWriter, VoxelWriterConfig, WriteError, WriteProgress,
    WriteSummary, WriterHooks,
};
