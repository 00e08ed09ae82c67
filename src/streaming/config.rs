//! Streaming configuration with JSON persistence
//!
//! Tier thresholds are stored as plain `{name, step, distance}` entries;
//! squared thresholds are recomputed whenever a file is loaded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::lod::{LodTable, LodTier};
use crate::core::{Error, Result};
use crate::render::MaterialId;
use crate::voxel::chunk::DEFAULT_CHUNK_SIZE;

/// Largest view radius, in chunks, a config may ask for
pub const MAX_VIEW_RADIUS_CHUNKS: i32 = 1024;

/// Configuration for chunk streaming and LOD selection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunk edge length in meters
    pub chunk_size: f32,
    /// Radius around the viewer in which chunks are kept active (meters)
    pub view_distance: f32,
    /// Whether active chunks carry a collision volume
    pub generate_colliders: bool,
    /// Material bound to every chunk mesh
    pub material: MaterialId,
    /// LOD tiers, finest first
    pub tiers: Vec<LodTier>,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            view_distance: 256.0,
            generate_colliders: true,
            material: MaterialId(0),
            tiers: LodTable::default().tiers().to_vec(),
        }
    }
}

impl StreamingConfig {
    /// Build the LOD table described by `tiers`
    pub fn lod_table(&self) -> Result<LodTable> {
        LodTable::new(self.tiers.clone())
    }

    /// Check that the streamed area is finite and not degenerate
    pub fn validate(&self) -> Result<()> {
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(Error::Config(format!(
                "chunk_size must be positive and finite, got {}",
                self.chunk_size
            )));
        }
        if !(self.view_distance.is_finite() && self.view_distance >= 0.0) {
            return Err(Error::Config(format!(
                "view_distance must be non-negative and finite, got {}",
                self.view_distance
            )));
        }
        if self.view_distance / self.chunk_size > MAX_VIEW_RADIUS_CHUNKS as f32 {
            return Err(Error::Config(format!(
                "view_distance {} spans more than {} chunks of size {}",
                self.view_distance, MAX_VIEW_RADIUS_CHUNKS, self.chunk_size
            )));
        }
        Ok(())
    }

    /// View distance in chunks, rounded up
    pub fn view_radius_chunks(&self) -> i32 {
        (self.view_distance / self.chunk_size).ceil() as i32
    }

    /// Save to file as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        log::debug!("Saved streaming config to {}", path.display());
        Ok(())
    }

    /// Load from file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!(
            "Loaded streaming config from {} ({} LOD tiers)",
            path.display(),
            config.tiers.len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamingConfig::default();
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.view_distance, 256.0);
        assert!(config.generate_colliders);
        assert_eq!(config.tiers.len(), 4);
        assert_eq!(config.view_radius_chunks(), 16);
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("streaming.json");

        let mut config = StreamingConfig::default();
        config.view_distance = 100.0;
        config.tiers[1].set_distance(80.0);
        config.save(&path).unwrap();

        let loaded = StreamingConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.tiers[1].sqr_distance(), 6400.0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streaming.json");
        std::fs::write(
            &path,
            r#"{ "view_distance": 64.0, "tiers": [ { "name": "only", "step": 1, "distance": 20.0 } ] }"#,
        )
        .unwrap();

        let config = StreamingConfig::load(&path).unwrap();
        assert_eq!(config.view_distance, 64.0);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);

        let table = config.lod_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.tiers()[0].sqr_distance(), 400.0);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = StreamingConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, Error::Io(_)));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let broken = StreamingConfig::load(&path).unwrap_err();
        assert!(matches!(broken, Error::Json(_)));
    }

    #[test]
    fn test_validate() {
        assert!(StreamingConfig::default().validate().is_ok());

        let bad = [
            StreamingConfig { chunk_size: 0.0, ..Default::default() },
            StreamingConfig { chunk_size: -16.0, ..Default::default() },
            StreamingConfig { chunk_size: f32::NAN, ..Default::default() },
            StreamingConfig { view_distance: f32::INFINITY, ..Default::default() },
            StreamingConfig { view_distance: -1.0, ..Default::default() },
            StreamingConfig { chunk_size: 0.001, ..Default::default() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::Config(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_load_rejects_zero_chunk_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streaming.json");
        std::fs::write(&path, r#"{ "chunk_size": 0.0 }"#).unwrap();

        let err = StreamingConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_tiers_rejected() {
        let config = StreamingConfig {
            tiers: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.lod_table(), Err(Error::Config(_))));
    }
}
