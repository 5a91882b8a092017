//! Destinations for batch writes.
//!
//! A [`VoxelStore`] accepts one grid-aligned region at a time. Each call is
//! all-or-nothing: either the whole batch lands or an error comes back and
//! nothing from that call is visible.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use glam::IVec3;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::batch_serial::{BatchRecord, BatchSerError};
use crate::region::VoxelRegion;
use crate::volume::VoxelVolume;

/// Errors returned by a [`VoxelStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying file operation failed.
    #[error("voxel store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Volume dimensions disagree with the region at this resolution.
    #[error("volume is {actual:?} voxels but region needs {expected:?}")]
    SizeMismatch {
        /// Cells implied by the region.
        expected: [usize; 3],
        /// Cells in the supplied volume.
        actual: [usize; 3],
    },
    /// Resolution does not fit the store's encoding.
    #[error("unsupported voxel resolution {0}")]
    InvalidResolution(i32),
    /// A stored record failed to decode.
    #[error(transparent)]
    Decode(#[from] BatchSerError),
}

/// An external voxel store.
pub trait VoxelStore: Send {
    /// Write a full batch. Atomic per call.
    fn write_voxels(
        &mut self,
        region: &VoxelRegion,
        resolution: i32,
        volume: &VoxelVolume,
    ) -> Result<(), StoreError>;

    /// Remove all previously written voxels.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Check a write request and build the record it would store.
fn make_record(
    region: &VoxelRegion,
    resolution: i32,
    volume: &VoxelVolume,
) -> Result<BatchRecord, StoreError> {
    let res = u16::try_from(resolution)
        .ok()
        .filter(|r| *r > 0)
        .ok_or(StoreError::InvalidResolution(resolution))?;
    let s = region.size_voxels(resolution);
    let expected = [s.x as usize, s.y as usize, s.z as usize];
    if volume.size() != expected {
        return Err(StoreError::SizeMismatch {
            expected,
            actual: volume.size(),
        });
    }
    Ok(BatchRecord {
        region: *region,
        resolution: res,
        volume: volume.clone(),
    })
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store keyed by region minimum corner.
///
/// Writing the same region twice replaces the earlier batch.
#[derive(Default)]
pub struct MemoryStore {
    batches: FxHashMap<IVec3, BatchRecord>,
    writes: usize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct regions held.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Returns `true` if nothing has been written since the last clear.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total successful `write_voxels` calls, including replacements.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Batch whose region starts at `min`.
    pub fn get(&self, min: IVec3) -> Option<&BatchRecord> {
        self.batches.get(&min)
    }

    /// Iterates over all held batches in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &BatchRecord> {
        self.batches.values()
    }
}

impl VoxelStore for MemoryStore {
    fn write_voxels(
        &mut self,
        region: &VoxelRegion,
        resolution: i32,
        volume: &VoxelVolume,
    ) -> Result<(), StoreError> {
        let record = make_record(region, resolution, volume)?;
        self.batches.insert(region.min(), record);
        self.writes += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.batches.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Appends each batch as a length-prefixed SVBT record to a file.
///
/// Each record goes out in a single `write_all` so an interrupted run leaves
/// at most one partial record at the tail.
pub struct FileStore {
    path: PathBuf,
    file: File,
}

impl FileStore {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every complete record from a store file.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<BatchRecord>, StoreError> {
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;

        let mut records = Vec::new();
        let mut offset = 0;
        while offset + 4 <= data.len() {
            let len = u32::from_le_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]) as usize;
            let start = offset + 4;
            let end = start + len;
            if end > data.len() {
                return Err(BatchSerError::Truncated {
                    expected: end,
                    actual: data.len(),
                }
                .into());
            }
            records.push(BatchRecord::deserialize(&data[start..end])?);
            offset = end;
        }
        Ok(records)
    }
}

impl VoxelStore for FileStore {
    fn write_voxels(
        &mut self,
        region: &VoxelRegion,
        resolution: i32,
        volume: &VoxelVolume,
    ) -> Result<(), StoreError> {
        let payload = make_record(region, resolution, volume)?.serialize();
        let mut framed = Vec::with_capacity(4 + payload.len());
        framed.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        framed.extend_from_slice(&payload);
        self.file.write_all(&framed)?;
        debug!(
            "Appended {} bytes for region {} to {}",
            framed.len(),
            region.min(),
            self.path.display()
        );
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.file.set_len(0)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
