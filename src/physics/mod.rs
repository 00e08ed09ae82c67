//! Collision backend boundary
//!
//! A chunk collider never owns geometry of its own: its geometry source is the
//! chunk's render mesh buffer, so collision always matches what is drawn.

pub mod headless;

pub use headless::HeadlessPhysics;

use crate::core::Result;
use crate::render::MeshHandle;

/// Handle to a collision volume owned by a [`CollisionBackend`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(pub u32);

/// Physics-side storage for chunk collision volumes
pub trait CollisionBackend {
    /// Allocate a collider with no geometry source.
    fn create_collider(&mut self) -> Result<ColliderHandle>;

    /// Check whether `collider` still refers to a live volume.
    fn contains_collider(&self, collider: ColliderHandle) -> bool;

    /// Mesh buffer the collider reads its geometry from.
    fn geometry_source(&self, collider: ColliderHandle) -> Option<MeshHandle>;

    /// Point the collider at a mesh buffer.
    fn set_geometry_source(&mut self, collider: ColliderHandle, mesh: MeshHandle);

    /// Drop any geometry the backend cached from the source buffer.
    ///
    /// Some physics engines snapshot geometry when a collider is enabled and
    /// never observe in-place edits of the source buffer. Chunk setup calls
    /// this after every (re)configuration so the next query rebuilds.
    fn invalidate_geometry(&mut self, collider: ColliderHandle);

    /// Release the collider permanently.
    fn release_collider(&mut self, collider: ColliderHandle);
}
