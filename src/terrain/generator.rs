//! Noise-based heightmap terrain meshing

use glam::Vec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::MeshGenerator;
use crate::render::MeshData;
use crate::voxel::chunk::{ChunkCoord, DEFAULT_CHUNK_SIZE};

/// Parameters controlling terrain generation
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub height_scale: f32, // Vertical scale (max height)
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
    pub chunk_size: f32,   // Chunk edge length in meters
    pub cells: u32,        // Grid cells per chunk edge at full detail
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 100.0,
            height_scale: 64.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            cells: 32,
        }
    }
}

/// Heightfield mesh generator using fractal Brownian motion (FBM)
///
/// Each chunk is meshed over its XZ footprint. The sample grid is thinned by
/// the decimation step, so coarser tiers produce fewer vertices while the
/// chunk edges stay at the same world positions.
pub struct HeightmapGenerator {
    params: TerrainParams,
    noise: Fbm<Perlin>,
}

impl HeightmapGenerator {
    /// Create a new generator with the given parameters
    pub fn new(params: TerrainParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Get terrain height at world position (x, z)
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let nx = (x / self.params.scale) as f64;
        let nz = (z / self.params.scale) as f64;

        // Noise in [-1, 1] mapped to [0, height_scale]
        let noise_value = self.noise.get([nx, nz]);
        let normalized = (noise_value + 1.0) / 2.0;
        (normalized * self.params.height_scale as f64) as f32
    }

    /// Surface normal from central differences over `eps` meters
    fn normal_at(&self, x: f32, z: f32, eps: f32) -> Vec3 {
        let dh_dx = (self.height_at(x + eps, z) - self.height_at(x - eps, z)) / (2.0 * eps);
        let dh_dz = (self.height_at(x, z + eps) - self.height_at(x, z - eps)) / (2.0 * eps);
        Vec3::new(-dh_dx, 1.0, -dh_dz).normalize()
    }
}

/// Grid sample indices along one chunk edge for a decimation step
///
/// Always includes both ends so neighbouring chunks meet at the border.
pub fn sample_indices(cells: u32, step: u32) -> Vec<u32> {
    let step = step.max(1) as usize;
    let mut samples: Vec<u32> = (0..=cells).step_by(step).collect();
    if samples.last() != Some(&cells) {
        samples.push(cells);
    }
    samples
}

impl MeshGenerator for HeightmapGenerator {
    fn generate(&self, coord: ChunkCoord, step: u32) -> MeshData {
        let size = self.params.chunk_size;
        let cells = self.params.cells.max(1);
        let cell_size = size / cells as f32;
        let origin = coord.world_origin(size);
        let samples = sample_indices(cells, step);
        let side = samples.len();

        let mut mesh = MeshData {
            positions: Vec::with_capacity(side * side),
            normals: Vec::with_capacity(side * side),
            indices: Vec::with_capacity((side - 1) * (side - 1) * 6),
        };

        let eps = cell_size * step.max(1) as f32 * 0.5;
        for &iz in &samples {
            for &ix in &samples {
                let local_x = ix as f32 * cell_size;
                let local_z = iz as f32 * cell_size;
                let wx = origin.x + local_x;
                let wz = origin.z + local_z;
                let height = self.height_at(wx, wz);

                mesh.positions.push([local_x, height - origin.y, local_z]);
                mesh.normals.push(self.normal_at(wx, wz, eps).to_array());
            }
        }

        let side = side as u32;
        for row in 0..side - 1 {
            for col in 0..side - 1 {
                let i0 = row * side + col;
                let i1 = i0 + 1;
                let i2 = i0 + side;
                let i3 = i2 + 1;
                // Counter-clockwise when viewed from +Y
                mesh.indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_params_default() {
        let params = TerrainParams::default();
        assert_eq!(params.seed, 12345);
        assert_eq!(params.scale, 100.0);
        assert_eq!(params.height_scale, 64.0);
        assert_eq!(params.octaves, 4);
        assert_eq!(params.cells, 32);
        assert_eq!(params.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_sample_indices() {
        assert_eq!(sample_indices(4, 1), vec![0, 1, 2, 3, 4]);
        assert_eq!(sample_indices(4, 2), vec![0, 2, 4]);
        assert_eq!(sample_indices(5, 2), vec![0, 2, 4, 5]);
        assert_eq!(sample_indices(4, 8), vec![0, 4]);
        assert_eq!(sample_indices(4, 0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_height_in_range() {
        let generator = HeightmapGenerator::new(TerrainParams::default());
        for i in 0..50 {
            let h = generator.height_at(i as f32 * 13.7, i as f32 * -7.1);
            assert!((-1.0..=65.0).contains(&h), "height {} out of range", h);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = HeightmapGenerator::new(TerrainParams::default());
        let b = HeightmapGenerator::new(TerrainParams::default());
        let coord = ChunkCoord::new(3, 0, -2);
        assert_eq!(a.generate(coord, 2), b.generate(coord, 2));
    }

    #[test]
    fn test_full_detail_vertex_count() {
        let generator = HeightmapGenerator::new(TerrainParams::default());
        let mesh = generator.generate(ChunkCoord::new(0, 0, 0), 1);

        assert_eq!(mesh.vertex_count(), 33 * 33);
        assert_eq!(mesh.triangle_count(), 32 * 32 * 2);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert!(mesh.max_index().unwrap() < mesh.vertex_count() as u32);
    }

    #[test]
    fn test_step_decimates_geometry() {
        let generator = HeightmapGenerator::new(TerrainParams::default());
        let coord = ChunkCoord::new(1, 0, 1);

        let counts: Vec<usize> = [1, 2, 4, 8]
            .iter()
            .map(|&step| generator.generate(coord, step).triangle_count())
            .collect();

        assert_eq!(counts, vec![2048, 512, 128, 32]);
    }

    #[test]
    fn test_decimated_edges_match_full_detail() {
        let generator = HeightmapGenerator::new(TerrainParams::default());
        let coord = ChunkCoord::new(-1, 0, 2);
        let full = generator.generate(coord, 1);
        let coarse = generator.generate(coord, 4);

        // Corner vertices sit at identical positions regardless of step
        assert_eq!(full.positions[0], coarse.positions[0]);
        assert_eq!(full.positions.last(), coarse.positions.last());
    }

    #[test]
    fn test_wide_indices_for_dense_grids() {
        let generator = HeightmapGenerator::new(TerrainParams {
            cells: 300,
            ..Default::default()
        });
        let mesh = generator.generate(ChunkCoord::new(0, 0, 0), 1);
        assert!(mesh.max_index().unwrap() > u16::MAX as u32);
    }

    #[test]
    fn test_normals_are_unit_and_upward() {
        let generator = HeightmapGenerator::new(TerrainParams::default());
        let mesh = generator.generate(ChunkCoord::new(0, 0, 0), 4);
        for n in &mesh.normals {
            let v = Vec3::from_array(*n);
            assert!((v.length() - 1.0).abs() < 1e-4);
            assert!(v.y > 0.0);
        }
    }
}
