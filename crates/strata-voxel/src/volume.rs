//! Dense material + occupancy storage for one batch write.
//!
//! Cells are laid out `[x][y][z]` (z fastest), matching the nested table
//! order the external store expects for its bulk write call.

use crate::material::Material;

/// A dense 3D block of voxels, each carrying a material and a fractional
/// occupancy in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelVolume {
    size: [usize; 3],
    materials: Vec<Material>,
    occupancy: Vec<f32>,
}

impl VoxelVolume {
    /// Creates an all-air volume of `sx * sy * sz` cells.
    pub fn new(sx: usize, sy: usize, sz: usize) -> Self {
        let len = sx * sy * sz;
        Self {
            size: [sx, sy, sz],
            materials: vec![Material::Air; len],
            occupancy: vec![0.0; len],
        }
    }

    /// Rebuild a volume from flat arrays in `[x][y][z]` order.
    ///
    /// Returns `None` when the array lengths do not match the size.
    pub fn from_parts(size: [usize; 3], materials: Vec<Material>, occupancy: Vec<f32>) -> Option<Self> {
        let len = size[0] * size[1] * size[2];
        (materials.len() == len && occupancy.len() == len).then_some(Self {
            size,
            materials,
            occupancy,
        })
    }

    /// Size in cells as `[x, y, z]`.
    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns `true` if the volume has no cells.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Returns `(material, occupancy)` at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is out of range.
    pub fn get(&self, x: usize, y: usize, z: usize) -> (Material, f32) {
        let i = self.linear_index(x, y, z);
        (self.materials[i], self.occupancy[i])
    }

    /// Sets the cell at `(x, y, z)`. Occupancy is clamped to `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is out of range.
    pub fn set(&mut self, x: usize, y: usize, z: usize, material: Material, occupancy: f32) {
        let i = self.linear_index(x, y, z);
        self.materials[i] = material;
        self.occupancy[i] = occupancy.clamp(0.0, 1.0);
    }

    /// Flat material array in `[x][y][z]` order.
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Flat occupancy array in `[x][y][z]` order.
    pub fn occupancy(&self) -> &[f32] {
        &self.occupancy
    }

    /// Number of cells whose material is not air.
    pub fn filled_count(&self) -> usize {
        self.materials.iter().filter(|m| **m != Material::Air).count()
    }

    fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        let [sx, sy, sz] = self.size;
        assert!(x < sx && y < sy && z < sz, "voxel ({x}, {y}, {z}) outside {sx}x{sy}x{sz}");
        (x * sy + y) * sz + z
    }
}
