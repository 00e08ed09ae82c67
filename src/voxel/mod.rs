//! Chunk resources and grid addressing

pub mod chunk;

pub use chunk::{Chunk, ChunkCoord, ChunkState, LivenessContext, Teardown, DEFAULT_CHUNK_SIZE};
