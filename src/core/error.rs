//! Error types for chunk resource management and LOD configuration

use thiserror::Error;

use crate::render::{IndexFormat, MeshHandle};
use crate::voxel::chunk::ChunkCoord;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// A backend could not create a mesh or collision resource.
    ///
    /// Treated as an environment-level failure: callers propagate it, nothing retries.
    #[error("Allocation error: {0}")]
    Allocation(String),

    #[error("Index overflow: index {max_index} exceeds {format:?} capacity")]
    IndexOverflow { max_index: u32, format: IndexFormat },

    /// Geometry was sent to a buffer the renderer no longer holds
    #[error("Mesh buffer {0:?} does not exist")]
    UnknownMesh(MeshHandle),

    #[error("Chunk {0:?} has not been set up")]
    NotSetUp(ChunkCoord),

    #[error("Unknown LOD tier id {0}")]
    UnknownTier(usize),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
