//! Interface to an external voxel store: material vocabulary, grid-aligned
//! regions, occupancy volumes, and the stores that accept batch writes.

pub mod batch_serial;
pub mod material;
pub mod region;
pub mod rle;
pub mod store;
pub mod volume;

pub use batch_serial::{BatchRecord, BatchSerError};
pub use material::{Material, MaterialError};
pub use region::{RegionError, VoxelRegion};
pub use store::{FileStore, MemoryStore, StoreError, VoxelStore};
pub use volume::VoxelVolume;
