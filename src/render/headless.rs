//! In-memory render backend
//!
//! Keeps mesh buffers as CPU-side [`MeshData`] so chunk lifecycles can be
//! driven and inspected without a GPU (tests, tooling, the headless driver).

use std::collections::HashMap;

use super::mesh::{IndexFormat, MaterialId, MeshData, MeshHandle};
use super::RenderBackend;
use crate::core::{Error, Result};

/// A mesh buffer held by the headless renderer
#[derive(Clone, Debug)]
pub struct MeshSlot {
    /// Index width chosen at creation
    pub format: IndexFormat,
    /// Current geometry
    pub data: MeshData,
    /// Material bound for drawing
    pub material: Option<MaterialId>,
    /// Number of uploads since creation
    pub uploads: u32,
}

/// Render backend storing mesh buffers in a hash map
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    meshes: HashMap<MeshHandle, MeshSlot>,
    next_id: u32,
    /// Maximum live buffers (None = unbounded)
    capacity: Option<usize>,
    created: u64,
    released: u64,
}

impl HeadlessRenderer {
    /// Create an unbounded renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer that fails allocation once `capacity` buffers are live
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Get a live mesh buffer
    pub fn mesh(&self, mesh: MeshHandle) -> Option<&MeshSlot> {
        self.meshes.get(&mesh)
    }

    /// Drop a buffer without going through its owner
    ///
    /// Simulates an external agent (editor tooling, device loss) removing a
    /// resource a chunk still references.
    pub fn forget_mesh(&mut self, mesh: MeshHandle) -> bool {
        self.meshes.remove(&mesh).is_some()
    }

    /// Number of live buffers
    pub fn live_count(&self) -> usize {
        self.meshes.len()
    }

    /// Total buffers ever created
    pub fn created_count(&self) -> u64 {
        self.created
    }

    /// Total buffers released through [`RenderBackend::release_mesh`]
    pub fn released_count(&self) -> u64 {
        self.released
    }
}

impl RenderBackend for HeadlessRenderer {
    fn create_mesh(&mut self, format: IndexFormat) -> Result<MeshHandle> {
        if let Some(capacity) = self.capacity
            && self.meshes.len() >= capacity
        {
            return Err(Error::Allocation(format!(
                "mesh buffer capacity {} exhausted",
                capacity
            )));
        }

        let handle = MeshHandle(self.next_id);
        self.next_id += 1;
        self.meshes.insert(
            handle,
            MeshSlot {
                format,
                data: MeshData::new(),
                material: None,
                uploads: 0,
            },
        );
        self.created += 1;
        Ok(handle)
    }

    fn contains_mesh(&self, mesh: MeshHandle) -> bool {
        self.meshes.contains_key(&mesh)
    }

    fn upload_mesh(&mut self, mesh: MeshHandle, data: &MeshData) -> Result<()> {
        let slot = self
            .meshes
            .get_mut(&mesh)
            .ok_or(Error::UnknownMesh(mesh))?;

        if !slot.format.fits(data) {
            return Err(Error::IndexOverflow {
                max_index: data.max_index().unwrap_or(0),
                format: slot.format,
            });
        }

        slot.data.clone_from(data);
        slot.uploads += 1;
        Ok(())
    }

    fn clear_mesh(&mut self, mesh: MeshHandle) {
        if let Some(slot) = self.meshes.get_mut(&mesh) {
            slot.data.clear();
        }
    }

    fn mesh_is_empty(&self, mesh: MeshHandle) -> bool {
        self.meshes.get(&mesh).is_none_or(|slot| slot.data.is_empty())
    }

    fn bind_material(&mut self, mesh: MeshHandle, material: MaterialId) {
        if let Some(slot) = self.meshes.get_mut(&mesh) {
            slot.material = Some(material);
        }
    }

    fn release_mesh(&mut self, mesh: MeshHandle) {
        if self.meshes.remove(&mesh).is_some() {
            self.released += 1;
        }
    }
}
