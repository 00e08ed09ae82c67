//! Chunk system for managing reusable per-chunk render and collision resources
//!
//! A [`Chunk`] is created once per grid slot kept alive by the streaming
//! system and then recycled: [`Chunk::setup`] may run any number of times and
//! heals whatever sub-resources went missing in between, while
//! [`Chunk::retire_or_destroy`] either parks the chunk for reuse or releases
//! it for good depending on the host's [`LivenessContext`].

use glam::Vec3;

use crate::core::{Error, Result};
use crate::physics::{ColliderHandle, CollisionBackend};
use crate::render::{IndexFormat, MaterialId, MeshData, MeshHandle, RenderBackend};
use crate::streaming::lod::TierId;

/// Default edge length of a chunk in world units (meters)
pub const DEFAULT_CHUNK_SIZE: f32 = 16.0;

/// Integer coordinate identifying a chunk in the world grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Convert world position to chunk coordinate
    pub fn from_world_pos(pos: Vec3, chunk_size: f32) -> Self {
        Self {
            x: (pos.x / chunk_size).floor() as i32,
            y: (pos.y / chunk_size).floor() as i32,
            z: (pos.z / chunk_size).floor() as i32,
        }
    }

    /// Get the world-space origin (minimum corner) of this chunk
    pub fn world_origin(&self, chunk_size: f32) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32) * chunk_size
    }

    /// Get the world-space center of this chunk
    pub fn world_center(&self, chunk_size: f32) -> Vec3 {
        self.world_origin(chunk_size) + Vec3::splat(chunk_size * 0.5)
    }

    /// Squared distance from the chunk center to `viewer`
    pub fn distance_squared_to(&self, viewer: Vec3, chunk_size: f32) -> f32 {
        self.world_center(chunk_size).distance_squared(viewer)
    }
}

/// Host context deciding how a chunk is torn down
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LivenessContext {
    /// Live simulation: chunks are pooled and reused
    #[default]
    Simulating,
    /// Authoring or preview tooling: chunks are released immediately
    Authoring,
}

/// Lifecycle state of a chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Created, `setup` has never run
    Uninitialized,
    /// Resources configured and visible
    Active,
    /// Retired for reuse: geometry cleared, resources retained, hidden
    Inactive,
}

/// Result of [`Chunk::retire_or_destroy`]
#[derive(Debug)]
pub enum Teardown {
    /// The chunk was parked with its resources intact and can be set up again
    Retired(Chunk),
    /// The chunk and all of its resources were released
    Destroyed,
}

impl Teardown {
    /// Get the retired chunk, if any
    pub fn into_retired(self) -> Option<Chunk> {
        match self {
            Teardown::Retired(chunk) => Some(chunk),
            Teardown::Destroyed => None,
        }
    }
}

/// A reusable bundle of per-chunk rendering and collision resources
#[derive(Debug)]
pub struct Chunk {
    /// Coordinate of this chunk in the world grid
    coord: ChunkCoord,
    /// Render mesh buffer (32-bit indices), present once set up
    mesh: Option<MeshHandle>,
    /// Collision volume sharing `mesh` as geometry, present iff colliders are enabled
    collider: Option<ColliderHandle>,
    /// Tier currently applied (index into the LOD table, not owned)
    tier: Option<TierId>,
    /// Material bound by the last setup
    material: Option<MaterialId>,
    generate_collider: bool,
    state: ChunkState,
}

impl Chunk {
    /// Create a chunk with no resources at the given coordinate
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            mesh: None,
            collider: None,
            tier: None,
            material: None,
            generate_collider: false,
            state: ChunkState::Uninitialized,
        }
    }

    /// Acquire or heal every resource and bind `material`
    ///
    /// Safe to call repeatedly: existing resources are kept, missing ones are
    /// recreated, and the collider is created or released to match
    /// `generate_collider` without touching the mesh buffer. Leaves the chunk
    /// [`ChunkState::Active`].
    pub fn setup(
        &mut self,
        material: MaterialId,
        generate_collider: bool,
        render: &mut impl RenderBackend,
        collision: &mut impl CollisionBackend,
    ) -> Result<()> {
        self.generate_collider = generate_collider;

        let mesh = self.acquire_mesh(render)?;

        if generate_collider {
            let collider = self.acquire_collider(collision)?;
            // A source pointing at a buffer the renderer dropped counts as empty
            let source_lost = collision
                .geometry_source(collider)
                .is_none_or(|source| !render.contains_mesh(source));
            if source_lost {
                collision.set_geometry_source(collider, mesh);
            }
            collision.invalidate_geometry(collider);
        } else if let Some(collider) = self.collider.take() {
            log::debug!("Chunk {:?}: releasing collider {:?}", self.coord, collider);
            collision.release_collider(collider);
        }

        render.bind_material(mesh, material);
        self.material = Some(material);
        self.state = ChunkState::Active;
        Ok(())
    }

    /// Get the mesh buffer, creating it if absent or removed externally
    fn acquire_mesh(&mut self, render: &mut impl RenderBackend) -> Result<MeshHandle> {
        match self.mesh {
            Some(mesh) if render.contains_mesh(mesh) => Ok(mesh),
            previous => {
                if let Some(lost) = previous {
                    log::warn!("Chunk {:?}: mesh buffer {:?} was lost, recreating", self.coord, lost);
                }
                let mesh = render.create_mesh(IndexFormat::U32)?;
                log::debug!("Chunk {:?}: created mesh buffer {:?}", self.coord, mesh);
                self.mesh = Some(mesh);
                Ok(mesh)
            }
        }
    }

    /// Get the collider, creating it if absent or removed externally
    fn acquire_collider(&mut self, collision: &mut impl CollisionBackend) -> Result<ColliderHandle> {
        match self.collider {
            Some(collider) if collision.contains_collider(collider) => Ok(collider),
            previous => {
                if let Some(lost) = previous {
                    log::warn!("Chunk {:?}: collider {:?} was lost, recreating", self.coord, lost);
                }
                let collider = collision.create_collider()?;
                log::debug!("Chunk {:?}: created collider {:?}", self.coord, collider);
                self.collider = Some(collider);
                Ok(collider)
            }
        }
    }

    /// Check whether a resource went missing since the last setup
    ///
    /// True when the mesh buffer is gone, or when a collider is wanted but is
    /// absent or no longer bound to a live buffer.
    pub fn needs_repair(
        &self,
        render: &impl RenderBackend,
        collision: &impl CollisionBackend,
    ) -> bool {
        if self.mesh.is_none_or(|mesh| !render.contains_mesh(mesh)) {
            return true;
        }
        self.generate_collider
            && self.collider.is_none_or(|collider| {
                !collision.contains_collider(collider)
                    || collision
                        .geometry_source(collider)
                        .is_none_or(|source| !render.contains_mesh(source))
            })
    }

    /// Retire the chunk for reuse or destroy it, depending on `context`
    ///
    /// - [`LivenessContext::Simulating`]: geometry is cleared, the buffer and
    ///   collider are kept, and the chunk comes back as [`Teardown::Retired`]
    ///   in [`ChunkState::Inactive`].
    /// - [`LivenessContext::Authoring`]: every owned resource is released and
    ///   the chunk is consumed.
    pub fn retire_or_destroy(
        mut self,
        context: LivenessContext,
        render: &mut impl RenderBackend,
        collision: &mut impl CollisionBackend,
    ) -> Teardown {
        match context {
            LivenessContext::Simulating => {
                if let Some(mesh) = self.mesh {
                    render.clear_mesh(mesh);
                }
                self.state = ChunkState::Inactive;
                log::debug!("Chunk {:?}: retired", self.coord);
                Teardown::Retired(self)
            }
            LivenessContext::Authoring => {
                if let Some(collider) = self.collider.take() {
                    collision.release_collider(collider);
                }
                if let Some(mesh) = self.mesh.take() {
                    render.release_mesh(mesh);
                }
                log::debug!("Chunk {:?}: destroyed", self.coord);
                Teardown::Destroyed
            }
        }
    }

    /// Upload generated geometry into this chunk's own mesh buffer
    ///
    /// The buffer is rewritten in place, so the collider (if any) is told to
    /// drop whatever geometry it cached from it.
    pub fn install_mesh(
        &self,
        data: &MeshData,
        render: &mut impl RenderBackend,
        collision: &mut impl CollisionBackend,
    ) -> Result<()> {
        let mesh = self.mesh.ok_or(Error::NotSetUp(self.coord))?;
        render.upload_mesh(mesh, data)?;
        if let Some(collider) = self.collider {
            collision.invalidate_geometry(collider);
        }
        Ok(())
    }

    /// Move the chunk to another grid slot (used when recycling)
    pub fn set_coord(&mut self, coord: ChunkCoord) {
        self.coord = coord;
    }

    /// Assign the LOD tier, returning true if it changed
    pub fn assign_tier(&mut self, tier: TierId) -> bool {
        let changed = self.tier != Some(tier);
        self.tier = Some(tier);
        changed
    }

    /// Forget the assigned tier so the next assignment counts as a change
    pub fn clear_tier(&mut self) {
        self.tier = None;
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ChunkState::Active
    }

    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    pub fn collider(&self) -> Option<ColliderHandle> {
        self.collider
    }

    pub fn tier(&self) -> Option<TierId> {
        self.tier
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    pub fn generates_collider(&self) -> bool {
        self.generate_collider
    }
}
