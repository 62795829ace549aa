//! Chunk surface meshes: one textured cube per cached block.
//!
//! Geometry uses unit cubes centered on integer block positions. Each block
//! contributes 24 vertices (4 per face), 36 triangle indices, and 24 texture
//! coordinates; indices within a block are offset by the 24 vertices of every
//! block emitted before it.

use cobble_world::BlockPos;
use rustc_hash::FxHashSet;

/// Vertices a single block adds to a chunk mesh.
pub const VERTICES_PER_BLOCK: usize = 24;
/// Triangle indices a single block adds to a chunk mesh.
pub const INDICES_PER_BLOCK: usize = 36;

/// Corner offsets of a unit cube centered on the block position, grouped
/// 4 per face: back, front, left, right, top, bottom.
#[rustfmt::skip]
const CUBE_VERTICES: [[f32; 3]; VERTICES_PER_BLOCK] = [
    [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
    [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5],
    [-0.5, -0.5,  0.5], [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [-0.5,  0.5,  0.5],
    [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5],
    [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
    [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [-0.5, -0.5, -0.5],
];

/// Two triangles per face, indexing into [`CUBE_VERTICES`].
#[rustfmt::skip]
const CUBE_INDICES: [u32; INDICES_PER_BLOCK] = [
     0,  1,  2,  2,  3,  0,
     4,  5,  6,  6,  7,  4,
     8,  9, 10, 10, 11,  8,
    12, 13, 14, 14, 15, 12,
    16, 17, 18, 18, 19, 16,
    20, 21, 22, 22, 23, 20,
];

/// Texture corners of one quad face, repeated for all six faces.
const FACE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Geometry for one chunk's visible surface.
///
/// Buffers are parallel: `uvs` has one entry per vertex, and `indices`
/// reference positions in `vertices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    /// Vertex positions in world coordinates.
    pub vertices: Vec<[f32; 3]>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
    /// Texture coordinates, one per vertex.
    pub uvs: Vec<[f32; 2]>,
}

impl SurfaceMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one cube at `pos`, offsetting its indices past all vertices
    /// already in the mesh.
    pub fn push_block(&mut self, pos: BlockPos) {
        let base = self.vertices.len() as u32;
        for corner in CUBE_VERTICES {
            self.vertices.push([
                corner[0] + pos.x as f32,
                corner[1] + pos.y as f32,
                corner[2] + pos.z as f32,
            ]);
        }
        for index in CUBE_INDICES {
            self.indices.push(index + base);
        }
        for _ in 0..6 {
            self.uvs.extend_from_slice(&FACE_UVS);
        }
    }

    /// Number of blocks this mesh was built from.
    pub fn block_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_BLOCK
    }

    /// Returns `true` if the mesh holds no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Builds the surface mesh for one chunk's block set.
///
/// Blocks are emitted in sorted order so the same set always produces the
/// same buffers, regardless of hash iteration order.
pub fn chunk_mesh(blocks: &FxHashSet<BlockPos>) -> SurfaceMesh {
    let mut sorted: Vec<BlockPos> = blocks.iter().copied().collect();
    sorted.sort_unstable();

    let mut mesh = SurfaceMesh {
        vertices: Vec::with_capacity(sorted.len() * VERTICES_PER_BLOCK),
        indices: Vec::with_capacity(sorted.len() * INDICES_PER_BLOCK),
        uvs: Vec::with_capacity(sorted.len() * VERTICES_PER_BLOCK),
    };
    for block in sorted {
        mesh.push_block(block);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_set(blocks: &[(i64, i64, i64)]) -> FxHashSet<BlockPos> {
        blocks
            .iter()
            .map(|&(x, y, z)| BlockPos::new(x, y, z))
            .collect()
    }

    #[test]
    fn test_empty_block_set_produces_empty_mesh() {
        let mesh = chunk_mesh(&FxHashSet::default());
        assert!(mesh.is_empty());
        assert_eq!(mesh.block_count(), 0);
    }

    #[test]
    fn test_single_block_buffer_sizes() {
        let mesh = chunk_mesh(&block_set(&[(0, 0, 0)]));
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.uvs.len(), 24);
        assert_eq!(mesh.block_count(), 1);
    }

    #[test]
    fn test_single_block_geometry_centered_on_position() {
        let mesh = chunk_mesh(&block_set(&[(2, 3, -1)]));
        for v in &mesh.vertices {
            assert!((v[0] - 2.0).abs() == 0.5, "x corner off-center: {v:?}");
            assert!((v[1] - 3.0).abs() == 0.5, "y corner off-center: {v:?}");
            assert!((v[2] + 1.0).abs() == 0.5, "z corner off-center: {v:?}");
        }
        // All indices stay inside this block's 24 vertices.
        assert!(mesh.indices.iter().all(|&i| i < 24));
    }

    #[test]
    fn test_second_block_indices_are_offset() {
        let mesh = chunk_mesh(&block_set(&[(0, 0, 0), (1, 0, 0)]));
        assert_eq!(mesh.vertices.len(), 48);
        assert_eq!(mesh.indices.len(), 72);
        assert_eq!(mesh.uvs.len(), 48);

        let (first, second) = mesh.indices.split_at(36);
        assert!(first.iter().all(|&i| i < 24));
        assert!(second.iter().all(|&i| (24..48).contains(&i)));
    }

    #[test]
    fn test_uv_pattern_repeats_per_face() {
        let mesh = chunk_mesh(&block_set(&[(5, 5, 5)]));
        for face in mesh.uvs.chunks(4) {
            assert_eq!(face, FACE_UVS);
        }
    }

    #[test]
    fn test_mesh_is_deterministic_across_insertion_orders() {
        let forward = block_set(&[(0, 0, 0), (3, 1, 2), (-4, 0, 9), (7, 7, 7)]);
        let backward = block_set(&[(7, 7, 7), (-4, 0, 9), (3, 1, 2), (0, 0, 0)]);
        assert_eq!(chunk_mesh(&forward), chunk_mesh(&backward));
    }
}
