//! CPU-side mesh geometry and render resource handles

use serde::{Deserialize, Serialize};

/// Index width of a mesh buffer
///
/// Chunk meshes are always created with [`IndexFormat::U32`]: merged or
/// high-resolution chunk geometry routinely exceeds the 16-bit index range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexFormat {
    U16,
    #[default]
    U32,
}

impl IndexFormat {
    /// Largest vertex index addressable with this format
    pub fn max_index(self) -> u32 {
        match self {
            IndexFormat::U16 => u16::MAX as u32,
            IndexFormat::U32 => u32::MAX,
        }
    }

    /// Check whether every index of `data` fits this format
    pub fn fits(self, data: &MeshData) -> bool {
        data.max_index().is_none_or(|max| max <= self.max_index())
    }
}

/// Handle to a mesh buffer owned by a [`RenderBackend`](super::RenderBackend)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

/// Handle to a material managed outside this crate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// Geometry produced by a mesh generator, ready for upload
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions in chunk-local coordinates
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals (same length as `positions`)
    pub normals: Vec<[f32; 3]>,
    /// Triangle list, 3 indices per triangle
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Largest index referenced by the triangle list
    pub fn max_index(&self) -> Option<u32> {
        self.indices.iter().copied().max()
    }

    /// Remove all geometry, keeping allocated capacity
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(max: u32) -> MeshData {
        MeshData {
            positions: vec![[0.0; 3]; 3],
            normals: vec![[0.0, 1.0, 0.0]; 3],
            indices: vec![0, 1, max],
        }
    }

    #[test]
    fn test_default_format_is_wide() {
        assert_eq!(IndexFormat::default(), IndexFormat::U32);
    }

    #[test]
    fn test_index_format_fits() {
        let small = triangle(2);
        let large = triangle(70_000);

        assert!(IndexFormat::U16.fits(&small));
        assert!(!IndexFormat::U16.fits(&large));
        assert!(IndexFormat::U32.fits(&large));
        assert!(IndexFormat::U16.fits(&MeshData::new()));
    }

    #[test]
    fn test_mesh_counts_and_clear() {
        let mut mesh = triangle(2);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.is_empty());

        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.max_index(), None);
    }
}
