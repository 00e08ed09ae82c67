//! Rendering backend boundary: mesh buffers and material binding
//!
//! The crate never draws anything itself. It owns mesh buffer handles on
//! behalf of chunks and talks to the renderer through [`RenderBackend`].

pub mod mesh;
pub mod headless;

pub use mesh::{IndexFormat, MaterialId, MeshData, MeshHandle};
pub use headless::HeadlessRenderer;

use crate::core::Result;

/// Renderer-side storage for chunk mesh buffers
pub trait RenderBackend {
    /// Allocate an empty mesh buffer with the given index width.
    fn create_mesh(&mut self, format: IndexFormat) -> Result<MeshHandle>;

    /// Check whether `mesh` still refers to a live buffer.
    ///
    /// Buffers can disappear underneath a chunk (e.g. removed by tooling);
    /// chunk setup uses this to heal its references.
    fn contains_mesh(&self, mesh: MeshHandle) -> bool;

    /// Replace the buffer's geometry with `data`.
    fn upload_mesh(&mut self, mesh: MeshHandle, data: &MeshData) -> Result<()>;

    /// Remove all geometry from the buffer, keeping the buffer itself.
    fn clear_mesh(&mut self, mesh: MeshHandle);

    /// Check whether the buffer currently holds no triangles.
    fn mesh_is_empty(&self, mesh: MeshHandle) -> bool;

    /// Bind the material used to draw `mesh`.
    fn bind_material(&mut self, mesh: MeshHandle, material: MaterialId);

    /// Release the buffer permanently.
    fn release_mesh(&mut self, mesh: MeshHandle);
}
