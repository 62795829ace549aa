//! Snapshot image types: the complete world view the authority broadcasts.
//!
//! A snapshot is not a delta. Applying one replaces the entire client-side
//! cache, so the image carries every chunk and every player the server
//! currently knows about.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::coords::{BlockPos, ChunkCoord};

/// Opaque identifier the authority assigns to each connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

/// Replicated state of one remote player.
///
/// Fully replaced on every snapshot; there is no per-field merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// World-space position.
    pub position: [f64; 3],
}

/// Complete replacement image of the shared world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Every occupied chunk and its block set.
    pub chunk_blocks: FxHashMap<ChunkCoord, FxHashSet<BlockPos>>,
    /// Every connected player.
    pub players: FxHashMap<PlayerId, PlayerState>,
}

impl WorldSnapshot {
    /// Creates an empty snapshot (a world with no blocks and no players).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chunk's block set, replacing any previous entry.
    pub fn with_chunk(
        mut self,
        coord: ChunkCoord,
        blocks: impl IntoIterator<Item = BlockPos>,
    ) -> Self {
        self.chunk_blocks.insert(coord, blocks.into_iter().collect());
        self
    }

    /// Adds a player entry, replacing any previous entry.
    pub fn with_player(mut self, id: PlayerId, position: [f64; 3]) -> Self {
        self.players.insert(id, PlayerState { position });
        self
    }
}
