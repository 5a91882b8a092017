//! Voxel material vocabulary understood by the external voxel store.
//!
//! Air is always id 0 so that zero-initialized volume memory represents
//! empty space.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Discrete material stored in every voxel cell (1 byte).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Material {
    #[default]
    Air = 0,
    Water = 1,
    Rock = 2,
    Mud = 3,
    Sand = 4,
    Sandstone = 5,
    Limestone = 6,
    Basalt = 7,
    CrackedLava = 8,
    Snow = 9,
    Glacier = 10,
    Grass = 11,
    LeafyGrass = 12,
    Ground = 13,
}

/// Errors that can occur when decoding materials.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MaterialError {
    /// A stored byte does not name a material.
    #[error("unknown material id: {0}")]
    UnknownId(u8),
    /// A material name was not recognized.
    #[error("unknown material name: {0:?}")]
    UnknownName(String),
}

impl Material {
    /// Every material, ordered by id.
    pub const ALL: [Material; 14] = [
        Material::Air,
        Material::Water,
        Material::Rock,
        Material::Mud,
        Material::Sand,
        Material::Sandstone,
        Material::Limestone,
        Material::Basalt,
        Material::CrackedLava,
        Material::Snow,
        Material::Glacier,
        Material::Grass,
        Material::LeafyGrass,
        Material::Ground,
    ];

    /// Stable byte id used by the batch format.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Material::id`].
    pub fn from_id(id: u8) -> Result<Self, MaterialError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(MaterialError::UnknownId(id))
    }

    /// Host-facing material name.
    pub fn name(self) -> &'static str {
        match self {
            Material::Air => "Air",
            Material::Water => "Water",
            Material::Rock => "Rock",
            Material::Mud => "Mud",
            Material::Sand => "Sand",
            Material::Sandstone => "Sandstone",
            Material::Limestone => "Limestone",
            Material::Basalt => "Basalt",
            Material::CrackedLava => "CrackedLava",
            Material::Snow => "Snow",
            Material::Glacier => "Glacier",
            Material::Grass => "Grass",
            Material::LeafyGrass => "LeafyGrass",
            Material::Ground => "Ground",
        }
    }

    /// Whether the material forms terrain. Water and air are not solid.
    pub fn is_solid(self) -> bool {
        !matches!(self, Material::Air | Material::Water)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = MaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MaterialError::UnknownName(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
