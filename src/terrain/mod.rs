//! Mesh generation boundary and a procedural heightmap generator

pub mod generator;
pub use generator::{HeightmapGenerator, TerrainParams};

use crate::render::MeshData;
use crate::voxel::chunk::ChunkCoord;

/// Produces chunk geometry at a given decimation step
///
/// `step` is the tier's decimation factor: 1 is full detail, 2 keeps every
/// second sample, and so on. Output indices are 32-bit. Implementations must
/// be `Sync` so a driver can generate several chunks in parallel.
pub trait MeshGenerator: Sync {
    fn generate(&self, coord: ChunkCoord, step: u32) -> MeshData;
}
