//! Mesh-preview sampling over the `(resolution + 1)²` vertex grid.
//!
//! Vertex order matches a plane laid in XZ: index `i` sits at column
//! `i % (resolution + 1)` and row `i / (resolution + 1)`, with rows running
//! from `+half` down to `-half` in Z.

use std::path::Path;
use std::time::Instant;

use noise::NoiseFn;
use rayon::prelude::*;
use strata_config::{TerrainParameters, ViewMode};

use crate::biome::{Biome, Color};
use crate::raster::{ImageExportError, PreviewImage, save_heightmap_png};
use crate::sampler::TerrainSampler;

/// Sampled preview surface.
#[derive(Clone, Debug)]
pub struct PreviewMesh {
    pub resolution: u32,
    pub half_extent: f64,
    /// World-space vertex positions, `y` being the surface height.
    pub positions: Vec<[f32; 3]>,
    pub heights: Vec<f64>,
    pub tectonic_activity: Vec<f64>,
    pub biomes: Vec<Biome>,
    pub colors: Vec<Color>,
    /// Flat water plane height, present only for the standard view with
    /// water enabled.
    pub water_plane: Option<f64>,
}

impl PreviewMesh {
    pub fn generate(params: &TerrainParameters) -> Self {
        Self::generate_with(&TerrainSampler::new(params.clone()))
    }

    pub fn generate_with<N>(sampler: &TerrainSampler<N>) -> Self
    where
        N: NoiseFn<f64, 3> + Clone + Sync,
    {
        let params = sampler.params();
        let resolution = params.resolution;
        let side = resolution as usize + 1;
        let half = params.half_extent();
        let step = if resolution == 0 {
            0.0
        } else {
            params.map_size / resolution as f64
        };

        let start = Instant::now();
        tracing::info!(resolution, map_size = params.map_size, "sampling preview mesh");

        let points: Vec<_> = (0..side * side)
            .into_par_iter()
            .map(|i| {
                let ix = i % side;
                let iy = i / side;
                let x = -half + ix as f64 * step;
                let z = half - iy as f64 * step;
                let point = sampler.surface(x, z);
                (point, sampler.color(&point))
            })
            .collect();

        let mut mesh = PreviewMesh {
            resolution,
            half_extent: half,
            positions: Vec::with_capacity(points.len()),
            heights: Vec::with_capacity(points.len()),
            tectonic_activity: Vec::with_capacity(points.len()),
            biomes: Vec::with_capacity(points.len()),
            colors: Vec::with_capacity(points.len()),
            water_plane: (params.biomes.water && params.view_mode == ViewMode::Standard)
                .then(|| params.water_height()),
        };
        for (point, color) in points {
            let s = &point.sample;
            mesh.positions.push([s.x as f32, s.height as f32, s.z as f32]);
            mesh.heights.push(s.height);
            mesh.tectonic_activity.push(point.tectonic_activity);
            mesh.biomes.push(point.biome);
            mesh.colors.push(color);
        }

        let (min, max) = mesh.height_range();
        tracing::info!(
            vertices = mesh.vertex_count(),
            min_height = min,
            max_height = max,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "preview mesh sampled"
        );
        mesh
    }

    /// Vertices per side.
    pub fn side(&self) -> u32 {
        self.resolution + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.heights.len()
    }

    /// Lowest and highest sampled height.
    pub fn height_range(&self) -> (f64, f64) {
        self.heights
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }

    /// Top-down image with one pixel per vertex.
    pub fn to_image(&self) -> PreviewImage {
        let side = self.side();
        let mut image = PreviewImage::new(side, side);
        for (i, color) in self.colors.iter().enumerate() {
            let i = i as u32;
            image.set_rgb(i % side, i / side, color.to_rgb8());
        }
        image
    }

    /// Export the height grid as a 16-bit grayscale PNG over its own range.
    pub fn save_heightmap(&self, path: &Path) -> Result<(), ImageExportError> {
        let (min, max) = self.height_range();
        let max = if max > min { max } else { min + 1.0 };
        save_heightmap_png(&self.heights, self.side(), self.side(), min, max, path)
    }
}
