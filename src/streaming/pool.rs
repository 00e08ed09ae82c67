//! Chunk pool: keeps chunks around the viewer active and picks their LOD tier
//!
//! Every update:
//! 1. chunks that left the view radius are retired into a free list,
//! 2. newly visible grid slots reuse a retired chunk (or create one),
//! 3. active chunks that lost a resource are set up again,
//! 4. each active chunk is matched to the tier for its squared distance,
//! 5. chunks whose tier changed are regenerated at the tier's step.
//!
//! A chunk only records its new tier once the regenerated mesh is installed,
//! so a failed update leaves it due for a rebuild on the next one.
//!
//! Geometry generation runs in parallel on the rayon pool; every backend call
//! happens on the caller's thread.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use rayon::prelude::*;

use super::config::StreamingConfig;
use super::lod::{LodTable, TierId};
use crate::core::Result;
use crate::physics::CollisionBackend;
use crate::render::{MeshData, RenderBackend};
use crate::terrain::MeshGenerator;
use crate::voxel::chunk::{Chunk, ChunkCoord, ChunkState, LivenessContext, Teardown};

/// What a single [`ChunkPool::update`] did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Chunks that entered the view radius
    pub activated: usize,
    /// Of those, how many reused a retired chunk
    pub reused: usize,
    /// Of those, how many were newly created
    pub created: usize,
    /// Chunks that left the view radius
    pub retired: usize,
    /// Active chunks whose lost resources were recreated
    pub repaired: usize,
    /// Chunks whose mesh was regenerated
    pub rebuilt: usize,
    /// Active chunks after the update
    pub active: usize,
    /// Retired chunks available for reuse after the update
    pub inactive: usize,
}

/// Pool of reusable chunks driven by viewer position
pub struct ChunkPool {
    config: StreamingConfig,
    tiers: LodTable,
    /// Active chunks by grid slot
    active: HashMap<ChunkCoord, Chunk>,
    /// Retired chunks waiting for reuse
    inactive: Vec<Chunk>,
}

impl ChunkPool {
    /// Create a pool from configuration
    pub fn new(config: StreamingConfig) -> Result<Self> {
        let tiers = config.lod_table()?;
        Self::with_tiers(config, tiers)
    }

    /// Create a pool with an explicit tier table
    pub fn with_tiers(config: StreamingConfig, tiers: LodTable) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tiers,
            active: HashMap::new(),
            inactive: Vec::new(),
        })
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn tiers(&self) -> &LodTable {
        &self.tiers
    }

    /// Mutable tier access for live tuning
    ///
    /// Changed thresholds take effect on the next [`ChunkPool::update`].
    pub fn tiers_mut(&mut self) -> &mut LodTable {
        &mut self.tiers
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.active.get(&coord)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    pub fn active_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.active.keys().copied()
    }

    /// Tier for the chunk at `coord` seen from `viewer`
    pub fn select_tier(&self, coord: ChunkCoord, viewer: Vec3) -> TierId {
        self.tiers
            .select(coord.distance_squared_to(viewer, self.config.chunk_size))
    }

    /// Grid slots on the ground layer (y = 0) within the view distance
    ///
    /// Uses horizontal squared distance so viewer altitude does not shrink
    /// the streamed area. Sorted nearest first.
    pub fn wanted_coords(&self, viewer: Vec3) -> Vec<ChunkCoord> {
        let size = self.config.chunk_size;
        let radius = self.config.view_radius_chunks();
        let max_sqr = self.config.view_distance * self.config.view_distance;
        let center = ChunkCoord::from_world_pos(viewer, size);
        let flat_viewer = Vec3::new(viewer.x, 0.0, viewer.z);

        let mut wanted = Vec::new();
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let coord = ChunkCoord::new(center.x + dx, 0, center.z + dz);
                let c = coord.world_center(size);
                let sqr = Vec3::new(c.x, 0.0, c.z).distance_squared(flat_viewer);
                if sqr <= max_sqr {
                    wanted.push((sqr, coord));
                }
            }
        }

        wanted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        wanted.into_iter().map(|(_, coord)| coord).collect()
    }

    /// Stream chunks around `viewer` and bring their LOD up to date
    pub fn update<R, C, G>(
        &mut self,
        viewer: Vec3,
        render: &mut R,
        collision: &mut C,
        generator: &G,
    ) -> Result<UpdateStats>
    where
        R: RenderBackend,
        C: CollisionBackend,
        G: MeshGenerator,
    {
        let mut stats = UpdateStats::default();
        let wanted = self.wanted_coords(viewer);
        let wanted_set: HashSet<ChunkCoord> = wanted.iter().copied().collect();

        // Retire chunks that left the view radius
        let leaving: Vec<ChunkCoord> = self
            .active
            .keys()
            .filter(|coord| !wanted_set.contains(coord))
            .copied()
            .collect();
        for coord in leaving {
            if let Some(chunk) = self.active.remove(&coord) {
                self.park(chunk, render, collision);
                stats.retired += 1;
            }
        }

        // Set up again any active chunk whose buffer or collider went missing
        let broken: Vec<ChunkCoord> = self
            .active
            .iter()
            .filter(|(_, chunk)| chunk.needs_repair(&*render, &*collision))
            .map(|(coord, _)| *coord)
            .collect();
        for coord in broken {
            if let Some(chunk) = self.active.get_mut(&coord) {
                log::warn!("Chunk {:?}: resources lost while active, repairing", coord);
                chunk.setup(
                    self.config.material,
                    self.config.generate_colliders,
                    render,
                    collision,
                )?;
                chunk.clear_tier();
                stats.repaired += 1;
            }
        }

        // Activate newly visible slots, recycling retired chunks first
        for coord in wanted {
            if self.active.contains_key(&coord) {
                continue;
            }

            let mut chunk = match self.inactive.pop() {
                Some(mut chunk) => {
                    chunk.set_coord(coord);
                    chunk.clear_tier();
                    stats.reused += 1;
                    chunk
                }
                None => {
                    stats.created += 1;
                    Chunk::new(coord)
                }
            };

            if let Err(err) = chunk.setup(
                self.config.material,
                self.config.generate_colliders,
                render,
                collision,
            ) {
                log::error!("Chunk {:?}: setup failed: {}", coord, err);
                if chunk.state() == ChunkState::Uninitialized {
                    // Never activated: release whatever it managed to acquire
                    chunk.retire_or_destroy(LivenessContext::Authoring, render, collision);
                } else {
                    self.inactive.push(chunk);
                }
                return Err(err);
            }

            self.active.insert(coord, chunk);
            stats.activated += 1;
        }

        // Select tiers; a changed tier means the mesh must be rebuilt
        let mut dirty: Vec<(ChunkCoord, TierId, u32)> = Vec::new();
        for (coord, chunk) in self.active.iter() {
            let sqr = coord.distance_squared_to(viewer, self.config.chunk_size);
            let tier = self.tiers.select(sqr);
            if chunk.tier() != Some(tier) {
                // Tier ids come from this table, so the lookup cannot miss
                let step = self.tiers.get(tier).map_or(1, |t| t.step());
                dirty.push((*coord, tier, step));
            }
        }

        let meshes: Vec<(ChunkCoord, TierId, MeshData)> = dirty
            .par_iter()
            .map(|&(coord, tier, step)| (coord, tier, generator.generate(coord, step)))
            .collect();

        for (coord, tier, mesh) in &meshes {
            if let Some(chunk) = self.active.get_mut(coord) {
                chunk.install_mesh(mesh, render, collision)?;
                chunk.assign_tier(*tier);
                stats.rebuilt += 1;
            }
        }

        stats.active = self.active.len();
        stats.inactive = self.inactive.len();

        if stats.activated > 0 || stats.retired > 0 || stats.repaired > 0 || stats.rebuilt > 0 {
            log::info!(
                "Chunk pool: +{} (reused {}, new {}) -{} repaired {} rebuilt {} | active {} inactive {}",
                stats.activated,
                stats.reused,
                stats.created,
                stats.retired,
                stats.repaired,
                stats.rebuilt,
                stats.active,
                stats.inactive
            );
        }

        Ok(stats)
    }

    /// Turn collision volumes on or off for every active chunk
    ///
    /// Reconciles colliders through [`Chunk::setup`]; mesh buffers are left
    /// untouched. Retired chunks pick up the setting when reused.
    pub fn set_generate_colliders(
        &mut self,
        enabled: bool,
        render: &mut impl RenderBackend,
        collision: &mut impl CollisionBackend,
    ) -> Result<()> {
        self.config.generate_colliders = enabled;
        for chunk in self.active.values_mut() {
            chunk.setup(self.config.material, enabled, render, collision)?;
        }
        Ok(())
    }

    /// Tear down every chunk
    ///
    /// In [`LivenessContext::Simulating`] all chunks end up retired and ready
    /// for reuse; in [`LivenessContext::Authoring`] they are destroyed.
    /// Returns the number of chunks destroyed.
    pub fn shutdown(
        &mut self,
        context: LivenessContext,
        render: &mut impl RenderBackend,
        collision: &mut impl CollisionBackend,
    ) -> usize {
        let chunks: Vec<Chunk> = self
            .active
            .drain()
            .map(|(_, chunk)| chunk)
            .chain(self.inactive.drain(..))
            .collect();

        let mut destroyed = 0;
        for chunk in chunks {
            match chunk.retire_or_destroy(context, render, collision) {
                Teardown::Retired(chunk) => self.inactive.push(chunk),
                Teardown::Destroyed => destroyed += 1,
            }
        }

        log::info!(
            "Chunk pool shut down ({:?}): {} destroyed, {} retained",
            context,
            destroyed,
            self.inactive.len()
        );
        destroyed
    }

    fn park(
        &mut self,
        chunk: Chunk,
        render: &mut impl RenderBackend,
        collision: &mut impl CollisionBackend,
    ) {
        if let Teardown::Retired(chunk) =
            chunk.retire_or_destroy(LivenessContext::Simulating, render, collision)
        {
            self.inactive.push(chunk);
        }
    }
}
