//! Block and chunk coordinates.
//!
//! The world is an unbounded integer lattice of unit blocks, partitioned into
//! square columns (chunks) on the x/z plane. Chunk coordinates come from
//! Euclidean floor division, so negative block positions land in negative
//! chunks rather than clustering around zero.

use glam::{DVec3, I64Vec3};
use serde::{Deserialize, Serialize};

/// Position of a single block on the world lattice.
///
/// Value identity: two equal positions name the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    /// World X in blocks.
    pub x: i64,
    /// World Y in blocks.
    pub y: i64,
    /// World Z in blocks.
    pub z: i64,
}

impl BlockPos {
    /// Creates a block position.
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Returns this position shifted by a unit face normal (or any integer
    /// delta).
    pub fn offset(self, delta: I64Vec3) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            z: self.z + delta.z,
        }
    }

    /// Block center as floating-point world coordinates.
    pub fn as_dvec3(self) -> DVec3 {
        DVec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

/// Coordinate of a chunk column on the x/z grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk grid X.
    pub x: i64,
    /// Chunk grid Z.
    pub z: i64,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// The chunk containing a block position.
    ///
    /// Uses Euclidean floor division: block x = -1 with chunk size 16 is in
    /// chunk -1, not chunk 0.
    pub fn containing(pos: BlockPos, chunk_size: i64) -> Self {
        Self {
            x: pos.x.div_euclid(chunk_size),
            z: pos.z.div_euclid(chunk_size),
        }
    }

    /// The chunk under a floating-point viewer position.
    pub fn containing_view(view: DVec3, chunk_size: i64) -> Self {
        Self {
            x: (view.x / chunk_size as f64).floor() as i64,
            z: (view.z / chunk_size as f64).floor() as i64,
        }
    }

    /// Chebyshev (chessboard) distance to another chunk.
    ///
    /// A square window of half-width `r` around a center is exactly the set
    /// of chunks with Chebyshev distance `<= r`.
    pub fn chebyshev(self, other: Self) -> i64 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}
