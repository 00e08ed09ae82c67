//! Chunk-LOD - reusable voxel chunk resources with distance-based level of detail

pub mod core;
pub mod voxel;
pub mod render;
pub mod physics;
pub mod streaming;
pub mod terrain;
