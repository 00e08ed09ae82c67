//! Chunk streaming and LOD management

pub mod lod;
pub mod config;
pub mod pool;

pub use lod::{LodTable, LodTier, TierId, DEFAULT_TIERS};
pub use config::StreamingConfig;
pub use pool::{ChunkPool, UpdateStats};
