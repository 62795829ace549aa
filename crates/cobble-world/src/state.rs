//! The synchronized world cache and its dirty-region tracker.
//!
//! [`WorldState`] is the client's only source of truth about the shared
//! world. Snapshots replace its contents wholesale; the [`DirtyTracker`]
//! records which chunk columns changed so the streaming pass can rebuild
//! exactly those. [`SharedWorld`] is the lock-guarded handle shared between
//! the network receive task and the simulation tick.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::coords::{BlockPos, ChunkCoord};
use crate::snapshot::{PlayerId, PlayerState, WorldSnapshot};

/// Chunk columns whose block sets changed since the last streaming pass.
///
/// Marking is idempotent; a chunk is rebuilt once no matter how many
/// snapshots touched it between passes.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty: FxHashSet<ChunkCoord>,
}

impl DirtyTracker {
    /// Records that `coord` needs a rebuild.
    pub fn mark_dirty(&mut self, coord: ChunkCoord) {
        self.dirty.insert(coord);
    }

    /// Hands the accumulated set to the caller and starts a fresh one, so
    /// every mark is observed by exactly one drain.
    pub fn drain(&mut self) -> FxHashSet<ChunkCoord> {
        std::mem::take(&mut self.dirty)
    }

    /// Chunks awaiting a rebuild.
    pub fn pending(&self) -> usize {
        self.dirty.len()
    }
}

/// Client-side cache of the shared world.
#[derive(Debug, Default)]
pub struct WorldState {
    /// Occupied chunks and their block sets, as of the latest snapshot.
    chunks: FxHashMap<ChunkCoord, FxHashSet<BlockPos>>,
    /// All known players, as of the latest snapshot.
    players: FxHashMap<PlayerId, PlayerState>,
    /// Chunks changed since the last streaming pass.
    dirty: DirtyTracker,
    /// Set once the first snapshot has been applied.
    loaded: bool,
}

impl WorldState {
    /// Creates an empty, not-yet-loaded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache contents with a new snapshot image.
    ///
    /// Every chunk present before or after the swap is marked dirty: a chunk
    /// only in the old image was deleted, a chunk only in the new image was
    /// created, and a chunk in both may have changed blocks. Re-marking
    /// unchanged chunks costs a rebuild, never correctness.
    pub fn apply_snapshot(&mut self, snapshot: WorldSnapshot) {
        for coord in self.chunks.keys() {
            self.dirty.mark_dirty(*coord);
        }
        for coord in snapshot.chunk_blocks.keys() {
            self.dirty.mark_dirty(*coord);
        }

        self.chunks = snapshot.chunk_blocks;
        self.players = snapshot.players;

        if !self.loaded {
            self.loaded = true;
            tracing::info!(
                chunks = self.chunks.len(),
                players = self.players.len(),
                "world loaded"
            );
        } else {
            tracing::debug!(
                chunks = self.chunks.len(),
                players = self.players.len(),
                dirty = self.dirty.pending(),
                "snapshot applied"
            );
        }
    }

    /// The block set of a chunk, if the chunk is present in the cache.
    pub fn chunk_blocks(&self, coord: ChunkCoord) -> Option<&FxHashSet<BlockPos>> {
        self.chunks.get(&coord)
    }

    /// Returns `true` if the chunk is present in the cache.
    pub fn contains_chunk(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Number of chunks in the cache.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterates over all cached chunk coordinates.
    pub fn chunk_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// All known players.
    pub fn players(&self) -> &FxHashMap<PlayerId, PlayerState> {
        &self.players
    }

    /// Returns `true` once the first snapshot has been applied.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Drains the dirty set for this streaming pass.
    pub fn drain_dirty(&mut self) -> FxHashSet<ChunkCoord> {
        self.dirty.drain()
    }

    /// Number of chunks currently marked dirty.
    pub fn dirty_count(&self) -> usize {
        self.dirty.pending()
    }
}

/// Shared handle to the world cache.
///
/// The receive task applies snapshots through the write lock while the
/// simulation tick reads (and drains dirty marks) through its own guard, so
/// a reader always observes a whole snapshot generation, never a half-applied
/// one.
#[derive(Debug, Clone, Default)]
pub struct SharedWorld {
    inner: Arc<RwLock<WorldState>>,
}

impl SharedWorld {
    /// Creates a handle around an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the read guard.
    ///
    /// A poisoned lock is recovered rather than propagated: snapshot
    /// application replaces whole maps, so the cache is consistent even if a
    /// writer panicked.
    pub fn read(&self) -> RwLockReadGuard<'_, WorldState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires the write guard. See [`read`](Self::read) on poisoning.
    pub fn write(&self) -> RwLockWriteGuard<'_, WorldState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies a snapshot under the write lock.
    pub fn apply_snapshot(&self, snapshot: WorldSnapshot) {
        self.write().apply_snapshot(snapshot);
    }

    /// Returns `true` once the first snapshot has been applied.
    pub fn is_loaded(&self) -> bool {
        self.read().is_loaded()
    }
}
