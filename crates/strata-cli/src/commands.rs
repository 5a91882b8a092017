//! Subcommand implementations. Each returns what it wrote so the caller and
//! tests can inspect it.

use std::path::{Path, PathBuf};

use strata_config::{Config, ConfigError, PreviewConfig};
use strata_terrain::{
    ImageExportError, PreviewMesh, TerrainSampler, VoxelWriterConfig, WriteError, WriteSummary,
    emit_luau_script, spawn_voxel_job_with_limit,
};
use strata_voxel::{FileStore, StoreError, VoxelStore};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Image(#[from] ImageExportError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a voxel run ended.
#[derive(Debug, PartialEq)]
pub enum VoxelRunEnd {
    Completed(WriteSummary),
    Stopped { batches_written: usize },
}

/// Where an artifact lands when no explicit path is given.
pub fn default_output(preview: &PreviewConfig, extension: &str) -> PathBuf {
    preview.output_dir.join(format!("{}.{extension}", preview.name))
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Print everything known about one surface point.
pub fn sample(config: &Config, x: f64, z: f64) -> String {
    let sampler = TerrainSampler::new(config.terrain.clone());
    let point = sampler.surface(x, z);
    let height = sampler.heights().sample(x, z);
    let s = &point.sample;
    let color = sampler.color(&point).to_rgb8();

    format!(
        "position:    ({x}, {z})\n\
         height:      {:.3}\n\
         river:       {}\n\
         tectonic:    {:.4}\n\
         slope:       {:.4}\n\
         temperature: {:.4}\n\
         humidity:    {:.4}\n\
         biome:       {:?}\n\
         material:    {}\n\
         color:       #{:02x}{:02x}{:02x}\n",
        height.height,
        height.is_river,
        height.tectonic_activity,
        s.slope,
        s.climate.temperature,
        s.climate.humidity,
        point.biome,
        point.biome.material(),
        color[0],
        color[1],
        color[2],
    )
}

/// Render the preview image, and optionally the 16-bit heightmap.
pub fn preview(
    config: &Config,
    out: Option<&Path>,
    heightmap: Option<&Path>,
) -> Result<PathBuf, CliError> {
    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(&config.preview, "png"));

    let mesh = PreviewMesh::generate(&config.terrain);
    ensure_parent(&out)?;
    mesh.to_image().save_png(&out)?;

    let (min, max) = mesh.height_range();
    info!(
        path = %out.display(),
        min_height = min,
        max_height = max,
        water_plane = ?mesh.water_plane,
        "preview written"
    );

    if let Some(path) = heightmap {
        ensure_parent(path)?;
        mesh.save_heightmap(path)?;
        info!(path = %path.display(), "heightmap written");
    }
    Ok(out)
}

/// Write the whole map into a voxel store file on a background job.
///
/// With `max_batches`, the writer stops after exactly that many batches.
pub fn voxels(
    config: &Config,
    out: Option<&Path>,
    max_batches: Option<usize>,
) -> Result<VoxelRunEnd, CliError> {
    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(&config.preview, "svb"));

    let writer_config = VoxelWriterConfig::from(&config.voxel);

    let mut store = FileStore::open(&out)?;
    store.clear()?;
    info!(path = %out.display(), "writing voxels");

    let job = spawn_voxel_job_with_limit(config.terrain.clone(), writer_config, store, max_batches)?;

    let mut last_percent = None;
    for progress in job.progress().iter() {
        if last_percent != Some(progress.percent) {
            println!("Generating: {}%", progress.percent);
            last_percent = Some(progress.percent);
        }
    }

    let outcome = job.join()?;
    match outcome.result {
        Ok(summary) => {
            println!(
                "Wrote {} batches ({} voxels) to {} in {:.1?}",
                summary.batches,
                summary.voxels,
                out.display(),
                summary.elapsed
            );
            Ok(VoxelRunEnd::Completed(summary))
        }
        Err(WriteError::Cancelled { batches_written }) => {
            warn!(batches_written, "voxel job stopped early");
            println!("Stopped after {batches_written} batches");
            Ok(VoxelRunEnd::Stopped { batches_written })
        }
        Err(e) => Err(e.into()),
    }
}

/// Emit the host script to a file, or return it for stdout.
pub fn script(config: &Config, out: Option<&Path>) -> Result<String, CliError> {
    let text = emit_luau_script(&config.terrain, &VoxelWriterConfig::from(&config.voxel));
    if let Some(path) = out {
        ensure_parent(path)?;
        std::fs::write(path, &text)?;
        info!(path = %path.display(), bytes = text.len(), "script written");
    }
    Ok(text)
}

/// Resolved config as RON, saved back to `config_dir` when asked.
pub fn config(config: &Config, config_dir: &Path, save: bool) -> Result<String, CliError> {
    if save {
        config.save(config_dir)?;
        info!(dir = %config_dir.display(), "config saved");
    }
    Ok(config.to_ron()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::TerrainParameters;

    fn small_config(dir: &Path) -> Config {
        let mut config = Config {
            terrain: TerrainParameters {
                map_size: 256.0,
                resolution: 8,
                ..Default::default()
            },
            ..Default::default()
        };
        config.voxel.batch_size_voxels = 8;
        config.preview.output_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn test_default_output_uses_preview_name() {
        let preview = PreviewConfig {
            output_dir: PathBuf::from("out"),
            name: "isle".to_string(),
        };
        assert_eq!(default_output(&preview, "png"), PathBuf::from("out/isle.png"));
    }

    #[test]
    fn test_sample_lists_fields() {
        let text = sample(&Config::default(), 100.0, -50.0);
        for key in ["height:", "temperature:", "humidity:", "biome:", "material:"] {
            assert!(text.contains(key), "missing {key} in:\n{text}");
        }
    }

    #[test]
    fn test_preview_writes_png_and_heightmap() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let heightmap = dir.path().join("maps/height.png");
        let out = preview(&config, None, Some(&heightmap)).unwrap();
        assert_eq!(out, dir.path().join("terrain.png"));
        assert!(out.exists());
        assert!(heightmap.exists());
    }

    #[test]
    fn test_voxels_completes_small_map() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let out = dir.path().join("world.svb");
        let end = voxels(&config, Some(&out), None).unwrap();
        match end {
            VoxelRunEnd::Completed(summary) => {
                assert_eq!(summary.batches, 64);
                assert_eq!(FileStore::read_all(&out).unwrap().len(), 64);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn test_voxels_max_batches_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let out = dir.path().join("partial.svb");
        let end = voxels(&config, Some(&out), Some(3)).unwrap();
        assert_eq!(end, VoxelRunEnd::Stopped { batches_written: 3 });
        assert_eq!(FileStore::read_all(&out).unwrap().len(), 3);
    }

    #[test]
    fn test_voxels_zero_max_batches_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let out = dir.path().join("empty.svb");
        let end = voxels(&config, Some(&out), Some(0)).unwrap();
        assert_eq!(end, VoxelRunEnd::Stopped { batches_written: 0 });
        assert!(FileStore::read_all(&out).unwrap().is_empty());
    }

    #[test]
    fn test_script_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.lua");
        let text = script(&Config::default(), Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
        assert!(text.starts_with("-- Strata voxel terrain generator"));
    }

    #[test]
    fn test_config_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.terrain.seed = 77;
        let ron = config(&cfg, dir.path(), true).unwrap();
        assert!(ron.contains("seed: 77"));
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(loaded, cfg);
    }
}
