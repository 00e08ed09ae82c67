//! In-memory collision backend

use std::collections::HashMap;

use super::{ColliderHandle, CollisionBackend};
use crate::core::{Error, Result};
use crate::render::MeshHandle;

/// A collision volume held by the headless backend
#[derive(Clone, Debug, Default)]
pub struct ColliderSlot {
    /// Mesh buffer supplying the collision geometry
    pub source: Option<MeshHandle>,
    /// Number of times cached geometry was invalidated
    pub invalidations: u32,
}

/// Collision backend storing colliders in a hash map
#[derive(Debug, Default)]
pub struct HeadlessPhysics {
    colliders: HashMap<ColliderHandle, ColliderSlot>,
    next_id: u32,
    /// Maximum live colliders (None = unbounded)
    capacity: Option<usize>,
    created: u64,
    released: u64,
}

impl HeadlessPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that fails allocation once `capacity` colliders are live
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn collider(&self, collider: ColliderHandle) -> Option<&ColliderSlot> {
        self.colliders.get(&collider)
    }

    /// Drop a collider without going through its owner
    pub fn forget_collider(&mut self, collider: ColliderHandle) -> bool {
        self.colliders.remove(&collider).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn created_count(&self) -> u64 {
        self.created
    }

    pub fn released_count(&self) -> u64 {
        self.released
    }
}

impl CollisionBackend for HeadlessPhysics {
    fn create_collider(&mut self) -> Result<ColliderHandle> {
        if let Some(capacity) = self.capacity
            && self.colliders.len() >= capacity
        {
            return Err(Error::Allocation(format!(
                "collider capacity {} exhausted",
                capacity
            )));
        }

        let handle = ColliderHandle(self.next_id);
        self.next_id += 1;
        self.colliders.insert(handle, ColliderSlot::default());
        self.created += 1;
        Ok(handle)
    }

    fn contains_collider(&self, collider: ColliderHandle) -> bool {
        self.colliders.contains_key(&collider)
    }

    fn geometry_source(&self, collider: ColliderHandle) -> Option<MeshHandle> {
        self.colliders.get(&collider).and_then(|slot| slot.source)
    }

    fn set_geometry_source(&mut self, collider: ColliderHandle, mesh: MeshHandle) {
        if let Some(slot) = self.colliders.get_mut(&collider) {
            slot.source = Some(mesh);
        }
    }

    fn invalidate_geometry(&mut self, collider: ColliderHandle) {
        if let Some(slot) = self.colliders.get_mut(&collider) {
            slot.invalidations += 1;
        }
    }

    fn release_collider(&mut self, collider: ColliderHandle) {
        if self.colliders.remove(&collider).is_some() {
            self.released += 1;
        }
    }
}
