//! Binary serialization for committed voxel batches.
//!
//! The SVBT (Strata Voxel BaTch) format stores one grid-aligned write: the
//! target region, its resolution, RLE-compressed material ids and occupancy
//! quantized to one byte per cell.
//!
//! ## Binary Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Magic bytes `b"SVBT"` |
//! | 4 | 1 | Format version (`u8`, currently 1) |
//! | 5 | 2 | Resolution (`u16`, little-endian) |
//! | 7 | 12 | Region min (`3 × i32`, little-endian) |
//! | 19 | 12 | Region max (`3 × i32`, little-endian) |
//! | 31 | 4 | Run count R (`u32`, little-endian) |
//! | 35 | R×3 | Material runs (`count: u16`, `id: u8`) |
//! | 35+R×3 | N | Occupancy, `round(occ × 255)` per cell |
//!
//! N is the voxel count of the region at the stored resolution.

use glam::IVec3;

use crate::material::{Material, MaterialError};
use crate::region::{RegionError, VoxelRegion};
use crate::rle::{RUN_BYTES, RleError, rle_decode, rle_encode, rle_from_bytes, rle_to_bytes};
use crate::volume::VoxelVolume;

/// Magic bytes identifying the SVBT format.
const MAGIC: [u8; 4] = *b"SVBT";

/// Current format version.
const FORMAT_VERSION: u8 = 1;

/// Fixed header length in bytes.
const HEADER_LEN: usize = 35;

/// Errors that can occur during batch deserialization.
#[derive(Debug, thiserror::Error)]
pub enum BatchSerError {
    /// The data does not start with the expected magic bytes.
    #[error("invalid magic bytes")]
    InvalidMagic,
    /// The format version is not supported by this build.
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u8),
    /// The data is shorter than expected.
    #[error("data truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Minimum expected byte count.
        expected: usize,
        /// Actual byte count received.
        actual: usize,
    },
    /// Stored region is not grid aligned.
    #[error(transparent)]
    Region(#[from] RegionError),
    /// Material runs are malformed.
    #[error(transparent)]
    Rle(#[from] RleError),
    /// A run names an unknown material.
    #[error(transparent)]
    Material(#[from] MaterialError),
}

/// One committed batch: where it goes and what it contains.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchRecord {
    pub region: VoxelRegion,
    pub resolution: u16,
    pub volume: VoxelVolume,
}

impl BatchRecord {
    /// Serializes this batch to a byte vector in the SVBT format.
    pub fn serialize(&self) -> Vec<u8> {
        let ids: Vec<u8> = self.volume.materials().iter().map(|m| m.id()).collect();
        let runs = rle_encode(&ids);

        let mut buf = Vec::with_capacity(HEADER_LEN + runs.len() * RUN_BYTES + ids.len());
        buf.extend_from_slice(&MAGIC);
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&self.resolution.to_le_bytes());
        for v in [self.region.min(), self.region.max()] {
            for c in v.to_array() {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        buf.extend_from_slice(&(runs.len() as u32).to_le_bytes());
        buf.extend_from_slice(&rle_to_bytes(&runs));
        buf.extend(
            self.volume
                .occupancy()
                .iter()
                .map(|occ| (occ.clamp(0.0, 1.0) * 255.0).round() as u8),
        );
        buf
    }

    /// Deserializes a batch from a byte slice in the SVBT format.
    ///
    /// Occupancy comes back quantized to 1/255 steps.
    pub fn deserialize(data: &[u8]) -> Result<Self, BatchSerError> {
        if data.len() < 4 || data[0..4] != MAGIC {
            return Err(BatchSerError::InvalidMagic);
        }
        if data.len() < 5 {
            return Err(BatchSerError::Truncated {
                expected: 5,
                actual: data.len(),
            });
        }
        let version = data[4];
        if version != FORMAT_VERSION {
            return Err(BatchSerError::UnsupportedVersion(version));
        }
        if data.len() < HEADER_LEN {
            return Err(BatchSerError::Truncated {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }

        let resolution = u16::from_le_bytes([data[5], data[6]]);
        let read_i32 = |offset: usize| {
            i32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
        };
        let min = IVec3::new(read_i32(7), read_i32(11), read_i32(15));
        let max = IVec3::new(read_i32(19), read_i32(23), read_i32(27));
        let region = VoxelRegion::new(min, max, resolution as i32)?;
        let run_count = u32::from_le_bytes([data[31], data[32], data[33], data[34]]) as usize;

        let size = region.size_voxels(resolution as i32);
        let size = [size.x as usize, size.y as usize, size.z as usize];
        let cells = size[0] * size[1] * size[2];

        let runs_end = HEADER_LEN + run_count * RUN_BYTES;
        let total_expected = runs_end + cells;
        if data.len() < total_expected {
            return Err(BatchSerError::Truncated {
                expected: total_expected,
                actual: data.len(),
            });
        }

        let runs = rle_from_bytes(&data[HEADER_LEN..runs_end], run_count)?;
        let materials = rle_decode(&runs, cells)?
            .into_iter()
            .map(Material::from_id)
            .collect::<Result<Vec<_>, _>>()?;
        let occupancy = data[runs_end..total_expected]
            .iter()
            .map(|b| *b as f32 / 255.0)
            .collect();

        let volume = VoxelVolume::from_parts(size, materials, occupancy).ok_or(
            BatchSerError::Truncated {
                expected: total_expected,
                actual: data.len(),
            },
        )?;

        Ok(Self {
            region,
            resolution,
            volume,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
