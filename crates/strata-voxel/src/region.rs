//! Grid-aligned box regions in world units.
//!
//! The external store only accepts writes whose bounds sit on the voxel grid,
//! so every region is validated against a resolution when it is built.

use glam::IVec3;

/// Errors raised when building a [`VoxelRegion`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegionError {
    /// Resolution must be a positive number of world units.
    #[error("voxel resolution must be positive, got {0}")]
    InvalidResolution(i32),
    /// A bound is not a multiple of the resolution.
    #[error("region bound {bound} is not aligned to resolution {resolution}")]
    Misaligned {
        /// The offending bound.
        bound: IVec3,
        /// The grid resolution.
        resolution: i32,
    },
    /// `max` must exceed `min` on every axis.
    #[error("empty region: min {min} max {max}")]
    Empty {
        /// Lower corner.
        min: IVec3,
        /// Upper corner.
        max: IVec3,
    },
}

/// Axis-aligned box `[min, max)` in world units, aligned to a voxel grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoxelRegion {
    min: IVec3,
    max: IVec3,
}

impl VoxelRegion {
    /// Build a region, checking alignment to `resolution` and non-emptiness.
    pub fn new(min: IVec3, max: IVec3, resolution: i32) -> Result<Self, RegionError> {
        if resolution <= 0 {
            return Err(RegionError::InvalidResolution(resolution));
        }
        for bound in [min, max] {
            if bound % resolution != IVec3::ZERO {
                return Err(RegionError::Misaligned { bound, resolution });
            }
        }
        if max.cmple(min).any() {
            return Err(RegionError::Empty { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower corner (inclusive).
    pub fn min(&self) -> IVec3 {
        self.min
    }

    /// Upper corner (exclusive).
    pub fn max(&self) -> IVec3 {
        self.max
    }

    /// Extent in world units.
    pub fn size(&self) -> IVec3 {
        self.max - self.min
    }

    /// Extent in voxels of the given resolution.
    pub fn size_voxels(&self, resolution: i32) -> IVec3 {
        self.size() / resolution
    }

    /// Total voxel count at the given resolution.
    pub fn voxel_count(&self, resolution: i32) -> usize {
        let s = self.size_voxels(resolution);
        s.x as usize * s.y as usize * s.z as usize
    }

    /// Whether two regions share any volume.
    pub fn overlaps(&self, other: &VoxelRegion) -> bool {
        self.min.cmplt(other.max).all() && other.min.cmplt(self.max).all()
    }
}

/// Round `value` down to the nearest multiple of `resolution`.
pub fn align_down(value: f64, resolution: i32) -> i32 {
    let r = resolution as f64;
    ((value / r).floor() * r) as i32
}

/// Round `value` up to the nearest multiple of `resolution`.
pub fn align_up(value: f64, resolution: i32) -> i32 {
    let r = resolution as f64;
    ((value / r).ceil() * r) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_region_accepted() {
        let region = VoxelRegion::new(IVec3::new(-128, 68, 0), IVec3::new(0, 148, 128), 4).unwrap();
        assert_eq!(region.size_voxels(4), IVec3::new(32, 20, 32));
        assert_eq!(region.voxel_count(4), 32 * 20 * 32);
    }

    #[test]
    fn test_misaligned_region_rejected() {
        let err = VoxelRegion::new(IVec3::new(1, 0, 0), IVec3::new(8, 8, 8), 4).unwrap_err();
        assert!(matches!(err, RegionError::Misaligned { .. }));
    }

    #[test]
    fn test_empty_region_rejected() {
        let err = VoxelRegion::new(IVec3::new(0, 8, 0), IVec3::new(8, 8, 8), 4).unwrap_err();
        assert!(matches!(err, RegionError::Empty { .. }));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let err = VoxelRegion::new(IVec3::ZERO, IVec3::ONE, 0).unwrap_err();
        assert_eq!(err, RegionError::InvalidResolution(0));
    }

    #[test]
    fn test_align_helpers() {
        assert_eq!(align_down(68.0, 4), 68);
        assert_eq!(align_down(67.9, 4), 64);
        assert_eq!(align_down(-1.0, 4), -4);
        assert_eq!(align_up(148.0, 4), 148);
        assert_eq!(align_up(145.5, 4), 148);
        assert_eq!(align_up(-2048.0, 4), -2048);
    }

    #[test]
    fn test_adjacent_regions_do_not_overlap() {
        let a = VoxelRegion::new(IVec3::ZERO, IVec3::splat(128), 4).unwrap();
        let b = VoxelRegion::new(IVec3::new(128, 0, 0), IVec3::new(256, 128, 128), 4).unwrap();
        let c = VoxelRegion::new(IVec3::new(64, 0, 0), IVec3::new(192, 128, 128), 4).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }
}
