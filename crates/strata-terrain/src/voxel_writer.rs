//! Batched voxel writes into an external store.
//!
//! The map is cut into square batches of `batch_size_voxels` columns per
//! side. Each batch samples its column heights once, sizes its vertical
//! extent to the local terrain, fills material and occupancy, and is handed
//! to the store in a single write.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use glam::IVec3;
use noise::NoiseFn;
use rayon::prelude::*;
use strata_config::{TerrainParameters, VoxelConfig};
use strata_voxel::region::{align_down, align_up};
use strata_voxel::{Material, RegionError, StoreError, VoxelRegion, VoxelStore, VoxelVolume};
use thiserror::Error;

use crate::biome::SurfaceSample;
use crate::field::PerlinField;
use crate::salt::det_sqrt;
use crate::sampler::TerrainSampler;

/// Solid buffer kept below the lowest surface of a batch.
pub const BOTTOM_MARGIN: f64 = 32.0;
/// Headroom kept above the highest surface (or water) of a batch.
pub const TOP_MARGIN: f64 = 8.0;
/// Ground cells are considered up to this far above the surface.
pub const SURFACE_SKIRT: f64 = 2.0;

// ---------------------------------------------------------------------------
// Configuration and reporting
// ---------------------------------------------------------------------------

/// Batch geometry and pacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelWriterConfig {
    /// Columns per batch side.
    pub batch_size_voxels: u32,
    /// World units per voxel.
    pub voxel_resolution: u32,
    /// Progress is reported and the host yielded to every this many batches.
    pub yield_every_batches: u32,
    /// Depth below the surface that keeps the biome material.
    pub underground_fill_depth: f64,
}

impl Default for VoxelWriterConfig {
    fn default() -> Self {
        Self::from(&VoxelConfig::default())
    }
}

impl From<&VoxelConfig> for VoxelWriterConfig {
    fn from(c: &VoxelConfig) -> Self {
        Self {
            batch_size_voxels: c.batch_size_voxels,
            voxel_resolution: c.voxel_resolution,
            yield_every_batches: c.yield_every_batches,
            underground_fill_depth: c.underground_fill_depth,
        }
    }
}

/// Progress snapshot after a committed batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteProgress {
    pub batches_done: usize,
    pub total_batches: usize,
    /// Whole percent complete, rounded down.
    pub percent: u32,
}

impl WriteProgress {
    fn new(batches_done: usize, total_batches: usize) -> Self {
        let percent = if total_batches == 0 {
            100
        } else {
            (batches_done * 100 / total_batches) as u32
        };
        Self {
            batches_done,
            total_batches,
            percent,
        }
    }
}

/// Totals for a finished run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WriteSummary {
    pub batches: usize,
    pub voxels: usize,
    pub elapsed: Duration,
}

/// Errors that stop a voxel write.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("voxel store write failed: {0}")]
    Store(#[from] StoreError),
    #[error("voxel write cancelled after {batches_written} batches")]
    Cancelled { batches_written: usize },
    #[error("invalid batch region: {0}")]
    Region(#[from] RegionError),
    #[error("batch size must be positive")]
    EmptyBatch,
    #[error("voxel writer thread panicked")]
    WorkerPanicked,
}

/// Callbacks into the host between batches.
pub trait WriterHooks {
    /// Called after every committed batch with the running count.
    fn on_batch(&mut self, _batches_done: usize) {}

    /// Called every `yield_every_batches` batches, and at completion when
    /// the last batch fell between reports.
    fn on_progress(&mut self, _progress: &WriteProgress) {}

    /// Called at the progress cadence to let the host run.
    fn on_yield(&mut self) {}
}

/// Hooks that do nothing.
pub struct NoHooks;

impl WriterHooks for NoHooks {}

/// Shared cancel flag, checked between batches only.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Batch layout
// ---------------------------------------------------------------------------

/// Horizontal batch grid covering the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPlan {
    pub start_x: i32,
    pub start_z: i32,
    /// Batch side length in world units.
    pub extent: i32,
    pub batches_x: usize,
    pub batches_z: usize,
}

impl BatchPlan {
    pub fn total(&self) -> usize {
        self.batches_x * self.batches_z
    }

    /// World origin of batch `(bx, bz)`.
    pub fn origin(&self, bx: usize, bz: usize) -> (i32, i32) {
        (
            self.start_x + bx as i32 * self.extent,
            self.start_z + bz as i32 * self.extent,
        )
    }
}

/// Grid-aligned vertical span `(bottom_y, top_y, layers)` for a batch.
///
/// `water` raises the top when the water surface sits above the terrain.
pub fn vertical_extent(min_h: f64, max_h: f64, water: Option<f64>, resolution: i32) -> (i32, i32, usize) {
    let max_h = water.map_or(max_h, |w| max_h.max(w));
    let bottom = align_down(min_h - BOTTOM_MARGIN, resolution);
    let top = align_up(max_h + TOP_MARGIN, resolution);
    let layers = ((top - bottom) / resolution).max(1);
    (bottom, bottom + layers * resolution, layers as usize)
}

/// Central-difference slope of column `(lx, lz)`; zero on the batch rim.
fn column_slope(heights: &[f64], side: usize, lx: usize, lz: usize, resolution: f64) -> f64 {
    if lx == 0 || lz == 0 || lx + 1 >= side || lz + 1 >= side {
        return 0.0;
    }
    let at = |x: usize, z: usize| heights[x * side + z];
    let dx = (at(lx + 1, lz) - at(lx - 1, lz)).abs() / (resolution * 2.0);
    let dz = (at(lx, lz + 1) - at(lx, lz - 1)).abs() / (resolution * 2.0);
    det_sqrt(dx * dx + dz * dz)
}

/// Material and occupancy of one cell at `world_y` in a column.
fn fill_cell(
    world_y: f64,
    surface: f64,
    water: Option<f64>,
    resolution: f64,
    fill_depth: f64,
    biome_material: Material,
) -> (Material, f32) {
    let mut material = Material::Air;
    let mut occupancy = 0.0;

    if world_y <= surface + SURFACE_SKIRT {
        occupancy = (0.5 + (surface - world_y) / resolution).clamp(0.0, 1.0);
        if occupancy > 0.0 {
            material = biome_material;
        }
    }

    if let Some(water) = water
        && world_y > surface
        && world_y <= water
    {
        let water_occ = (0.5 + (water - world_y) / resolution).clamp(0.0, 1.0);
        if water_occ > occupancy {
            material = Material::Water;
            occupancy = water_occ;
        }
    }

    if world_y < surface - SURFACE_SKIRT {
        occupancy = 1.0;
        material = if world_y > surface - fill_depth {
            biome_material
        } else {
            Material::Rock
        };
    }

    (material, occupancy as f32)
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Streams the whole map into a [`VoxelStore`], one batch at a time.
pub struct VoxelBatchWriter<N = PerlinField> {
    sampler: TerrainSampler<N>,
    config: VoxelWriterConfig,
}

impl VoxelBatchWriter<PerlinField> {
    pub fn new(params: TerrainParameters, config: VoxelWriterConfig) -> Self {
        Self::with_sampler(TerrainSampler::new(params), config)
    }
}

impl<N> VoxelBatchWriter<N>
where
    N: NoiseFn<f64, 3> + Clone + Sync,
{
    pub fn with_sampler(sampler: TerrainSampler<N>, config: VoxelWriterConfig) -> Self {
        Self { sampler, config }
    }

    pub fn config(&self) -> &VoxelWriterConfig {
        &self.config
    }

    fn resolution(&self) -> i32 {
        self.config.voxel_resolution as i32
    }

    /// Batch grid for the configured map.
    pub fn plan(&self) -> Result<BatchPlan, WriteError> {
        if self.config.batch_size_voxels == 0 {
            return Err(WriteError::EmptyBatch);
        }
        let res = self.resolution();
        if res <= 0 {
            return Err(RegionError::InvalidResolution(res).into());
        }
        let half = self.sampler.params().half_extent();
        let start = align_down(-half, res);
        let end = align_up(half, res);
        let extent = self.config.batch_size_voxels as i32 * res;
        let count = ((end - start) as usize).div_ceil(extent as usize);
        Ok(BatchPlan {
            start_x: start,
            start_z: start,
            extent,
            batches_x: count,
            batches_z: count,
        })
    }

    /// Build the region and volume for the batch whose corner is `(x0, z0)`.
    pub fn build_batch(&self, x0: i32, z0: i32) -> Result<(VoxelRegion, VoxelVolume), WriteError> {
        let params = self.sampler.params();
        let res = self.resolution();
        let r = res as f64;
        let side = self.config.batch_size_voxels as usize;

        let columns: Vec<_> = (0..side * side)
            .into_par_iter()
            .map(|i| {
                let wx = (x0 + (i / side) as i32 * res) as f64;
                let wz = (z0 + (i % side) as i32 * res) as f64;
                self.sampler.heights().sample(wx, wz)
            })
            .collect();
        let heights: Vec<f64> = columns.iter().map(|c| c.height).collect();

        let (min_h, max_h) = heights
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)));
        let water = params.biomes.water.then(|| params.water_height());
        let (bottom, top, layers) = vertical_extent(min_h, max_h, water, res);

        let extent = side as i32 * res;
        let region = VoxelRegion::new(
            IVec3::new(x0, bottom, z0),
            IVec3::new(x0 + extent, top, z0 + extent),
            res,
        )?;

        let mut volume = VoxelVolume::new(side, layers, side);
        for lx in 0..side {
            for lz in 0..side {
                let column = &columns[lx * side + lz];
                let surface = column.height;
                let x = (x0 + lx as i32 * res) as f64;
                let z = (z0 + lz as i32 * res) as f64;
                let sample = SurfaceSample {
                    x,
                    z,
                    height: surface,
                    slope: column_slope(&heights, side, lx, lz, r),
                    is_river: column.is_river,
                    climate: self.sampler.climate().sample(x, z, surface),
                };
                let biome_material = self.sampler.classifier().classify(&sample).material();

                for vy in 0..layers {
                    let world_y = (bottom + vy as i32 * res) as f64;
                    let (material, occupancy) = fill_cell(
                        world_y,
                        surface,
                        water,
                        r,
                        self.config.underground_fill_depth,
                        biome_material,
                    );
                    if occupancy > 0.0 {
                        volume.set(lx, vy, lz, material, occupancy);
                    }
                }
            }
        }
        Ok((region, volume))
    }

    /// Write every batch, reporting through `hooks` and stopping early when
    /// `cancel` is set.
    pub fn run<S, H>(
        &self,
        store: &mut S,
        hooks: &mut H,
        cancel: &CancellationToken,
    ) -> Result<WriteSummary, WriteError>
    where
        S: VoxelStore + ?Sized,
        H: WriterHooks + ?Sized,
    {
        let plan = self.plan()?;
        let total = plan.total();
        let res = self.resolution();
        let cadence = self.config.yield_every_batches.max(1) as usize;
        let start = Instant::now();

        tracing::info!(
            total_batches = total,
            map_size = self.sampler.params().map_size,
            resolution = res,
            "voxel generation started"
        );

        let mut done = 0;
        let mut voxels = 0;
        for bx in 0..plan.batches_x {
            for bz in 0..plan.batches_z {
                if cancel.is_cancelled() {
                    tracing::warn!(batches_written = done, total_batches = total, "voxel generation cancelled");
                    return Err(WriteError::Cancelled { batches_written: done });
                }

                let (x0, z0) = plan.origin(bx, bz);
                let (region, volume) = self.build_batch(x0, z0)?;
                if let Err(e) = store.write_voxels(&region, res, &volume) {
                    tracing::error!(x = x0, z = z0, error = %e, "voxel store write failed");
                    return Err(e.into());
                }
                tracing::debug!(x = x0, z = z0, layers = volume.size()[1], "batch committed");

                done += 1;
                voxels += volume.len();
                hooks.on_batch(done);
                if done % cadence == 0 {
                    hooks.on_progress(&WriteProgress::new(done, total));
                    hooks.on_yield();
                }
            }
        }

        if done == 0 || done % cadence != 0 {
            hooks.on_progress(&WriteProgress::new(done, total));
        }
        let summary = WriteSummary {
            batches: done,
            voxels,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            batches = summary.batches,
            voxels = summary.voxels,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "voxel generation finished"
        );
        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::MemoryStore;

    fn small_params() -> TerrainParameters {
        TerrainParameters {
            map_size: 256.0,
            ..Default::default()
        }
    }

    fn small_config() -> VoxelWriterConfig {
        VoxelWriterConfig {
            batch_size_voxels: 8,
            voxel_resolution: 4,
            yield_every_batches: 10,
            underground_fill_depth: 12.0,
        }
    }

    #[derive(Default)]
    struct Recorder {
        progress: Vec<WriteProgress>,
        yields: usize,
        batches: Vec<usize>,
        cancel_after_yields: Option<(usize, CancellationToken)>,
    }

    impl WriterHooks for Recorder {
        fn on_batch(&mut self, batches_done: usize) {
            self.batches.push(batches_done);
        }

        fn on_progress(&mut self, progress: &WriteProgress) {
            self.progress.push(*progress);
        }

        fn on_yield(&mut self) {
            self.yields += 1;
            if let Some((n, token)) = &self.cancel_after_yields
                && self.yields >= *n
            {
                token.cancel();
            }
        }
    }

    struct FailingStore {
        fail_on: usize,
        writes: usize,
    }

    impl VoxelStore for FailingStore {
        fn write_voxels(&mut self, _: &VoxelRegion, _: i32, _: &VoxelVolume) -> Result<(), StoreError> {
            self.writes += 1;
            if self.writes == self.fail_on {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            Ok(())
        }

        fn clear(&mut self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_vertical_extent() {
        assert_eq!(vertical_extent(100.0, 140.0, None, 4), (68, 148, 20));
        assert_eq!(vertical_extent(100.0, 140.0, Some(180.0), 4), (68, 188, 30));
        assert_eq!(vertical_extent(100.0, 140.0, Some(50.0), 4), (68, 148, 20));
        let (bottom, top, layers) = vertical_extent(-3.5, -3.5, None, 4);
        assert_eq!((bottom, top), (-36, 8));
        assert_eq!(layers, 11);
    }

    #[test]
    fn test_plan_covers_map() {
        let writer = VoxelBatchWriter::new(small_params(), small_config());
        let plan = writer.plan().unwrap();
        assert_eq!(plan.start_x, -128);
        assert_eq!(plan.extent, 32);
        assert_eq!((plan.batches_x, plan.batches_z), (8, 8));
        assert_eq!(plan.origin(7, 7), (96, 96));
    }

    #[test]
    fn test_plan_rounds_partial_batches_up() {
        let params = TerrainParameters {
            map_size: 250.0,
            ..Default::default()
        };
        let writer = VoxelBatchWriter::new(params, small_config());
        let plan = writer.plan().unwrap();
        assert_eq!(plan.start_x, -128);
        assert_eq!(plan.batches_x, 8, "aligned span 256 needs 8 batches of 32");
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = VoxelWriterConfig {
            batch_size_voxels: 0,
            ..small_config()
        };
        let writer = VoxelBatchWriter::new(small_params(), config);
        assert!(matches!(writer.plan(), Err(WriteError::EmptyBatch)));
    }

    #[test]
    fn test_run_writes_every_batch_once() {
        let writer = VoxelBatchWriter::new(small_params(), small_config());
        let mut store = MemoryStore::new();
        let mut hooks = Recorder::default();
        let summary = writer
            .run(&mut store, &mut hooks, &CancellationToken::new())
            .unwrap();
        assert_eq!(summary.batches, 64);
        assert_eq!(store.len(), 64);
        assert_eq!(store.write_count(), 64, "one store write per batch");
        let stored: usize = store.iter().map(|r| r.volume.len()).sum();
        assert_eq!(summary.voxels, stored);
    }

    #[test]
    fn test_progress_cadence() {
        let writer = VoxelBatchWriter::new(small_params(), small_config());
        let mut hooks = Recorder::default();
        writer
            .run(&mut MemoryStore::new(), &mut hooks, &CancellationToken::new())
            .unwrap();
        let done: Vec<usize> = hooks.progress.iter().map(|p| p.batches_done).collect();
        assert_eq!(done, vec![10, 20, 30, 40, 50, 60, 64]);
        assert_eq!(hooks.yields, 6);
        assert_eq!(hooks.progress[0].percent, 15);
        assert_eq!(hooks.progress.last().map(|p| p.percent), Some(100));
    }

    #[test]
    fn test_batch_hook_sees_every_commit() {
        let writer = VoxelBatchWriter::new(small_params(), small_config());
        let mut hooks = Recorder::default();
        writer
            .run(&mut MemoryStore::new(), &mut hooks, &CancellationToken::new())
            .unwrap();
        assert_eq!(hooks.batches, (1..=64).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancel_before_start_writes_nothing() {
        let writer = VoxelBatchWriter::new(small_params(), small_config());
        let mut store = MemoryStore::new();
        let token = CancellationToken::new();
        token.cancel();
        let result = writer.run(&mut store, &mut NoHooks, &token);
        assert!(matches!(result, Err(WriteError::Cancelled { batches_written: 0 })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_cancel_between_batches() {
        let writer = VoxelBatchWriter::new(small_params(), small_config());
        let mut store = MemoryStore::new();
        let token = CancellationToken::new();
        let mut hooks = Recorder {
            cancel_after_yields: Some((2, token.clone())),
            ..Default::default()
        };
        let result = writer.run(&mut store, &mut hooks, &token);
        assert!(matches!(result, Err(WriteError::Cancelled { batches_written: 20 })));
        assert_eq!(store.len(), 20, "committed batches stay in the store");
    }

    #[test]
    fn test_store_failure_stops_run() {
        let writer = VoxelBatchWriter::new(small_params(), small_config());
        let mut store = FailingStore { fail_on: 3, writes: 0 };
        let result = writer.run(&mut store, &mut NoHooks, &CancellationToken::new());
        assert!(matches!(result, Err(WriteError::Store(StoreError::Io(_)))));
        assert_eq!(store.writes, 3, "no writes after the failure");
    }

    #[test]
    fn test_columns_are_solid_below_and_empty_above() {
        let params = small_params();
        let water = params.water_height();
        let writer = VoxelBatchWriter::new(params, small_config());
        let sampler = TerrainSampler::new(small_params());
        let (region, volume) = writer.build_batch(0, 0).unwrap();
        let [sx, sy, sz] = volume.size();
        assert_eq!(region.size_voxels(4), IVec3::new(sx as i32, sy as i32, sz as i32));

        for lx in 0..sx {
            for lz in 0..sz {
                let surface = sampler.height((lx * 4) as f64, (lz * 4) as f64);
                for vy in 0..sy {
                    let world_y = (region.min().y + vy as i32 * 4) as f64;
                    let (material, occ) = volume.get(lx, vy, lz);
                    if world_y < surface - SURFACE_SKIRT {
                        assert_eq!(occ, 1.0, "buried cell must be solid");
                        if world_y <= surface - 12.0 {
                            assert_eq!(material, Material::Rock);
                        }
                    }
                    if world_y > surface + SURFACE_SKIRT && world_y > water {
                        assert_eq!((material, occ), (Material::Air, 0.0), "open air at y={world_y}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_fill_cell_rules() {
        let rock = Material::Rock;
        let grass = Material::Grass;
        // Exactly at the surface: half occupied.
        assert_eq!(fill_cell(10.0, 10.0, None, 4.0, 12.0, grass), (grass, 0.5));
        // Skirt above the surface fades out.
        assert_eq!(fill_cell(12.0, 10.0, None, 4.0, 12.0, grass), (Material::Air, 0.0));
        assert_eq!(fill_cell(11.0, 10.0, None, 4.0, 12.0, grass), (grass, 0.25));
        // Shallow underground keeps the biome, deep is rock.
        assert_eq!(fill_cell(4.0, 10.0, None, 4.0, 12.0, grass), (grass, 1.0));
        assert_eq!(fill_cell(-4.0, 10.0, None, 4.0, 12.0, grass), (rock, 1.0));
        // Water above a sunken surface.
        assert_eq!(fill_cell(20.0, 10.0, Some(30.0), 4.0, 12.0, grass), (Material::Water, 1.0));
        assert_eq!(fill_cell(30.0, 10.0, Some(30.0), 4.0, 12.0, grass), (Material::Water, 0.5));
        assert_eq!(fill_cell(34.0, 10.0, Some(30.0), 4.0, 12.0, grass), (Material::Air, 0.0));
        // Water displaces the thin ground skirt above a submerged surface.
        assert_eq!(fill_cell(11.0, 10.0, Some(11.0), 4.0, 12.0, grass), (Material::Water, 0.5));
    }

    #[test]
    fn test_column_slope_zero_on_rim() {
        let side = 4;
        let heights: Vec<f64> = (0..side * side).map(|i| (i / side) as f64 * 8.0).collect();
        assert_eq!(column_slope(&heights, side, 0, 1, 4.0), 0.0);
        assert_eq!(column_slope(&heights, side, 3, 1, 4.0), 0.0);
        assert_eq!(column_slope(&heights, side, 1, 3, 4.0), 0.0);
        assert_eq!(column_slope(&heights, side, 1, 1, 4.0), 2.0);
    }

    #[test]
    fn test_column_slope_combines_both_axes() {
        let side = 3;
        // h = 3x + 4z at 1 unit per column
        let heights: Vec<f64> = (0..side * side)
            .map(|i| ((i / side) * 3 + (i % side) * 4) as f64)
            .collect();
        let slope = column_slope(&heights, side, 1, 1, 1.0);
        assert_eq!(slope.to_bits(), det_sqrt(9.0 + 16.0).to_bits());
        assert!((slope - 5.0).abs() < 1e-12, "got {slope}");
    }
}
