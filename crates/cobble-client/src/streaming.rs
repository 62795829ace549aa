//! Distance-windowed surface streaming: materialize chunk surfaces near the
//! viewer, rebuild dirty ones, and evict those the viewer has left behind.

use glam::DVec3;
use rustc_hash::{FxHashMap, FxHashSet};

use cobble_world::{ChunkCoord, WorldState};

use crate::mesh::chunk_mesh;
use crate::renderer::{Renderer, SurfaceHandle};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for the surface streaming window.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Blocks per chunk edge on the horizontal axes. Default: 16.
    pub chunk_size: i64,
    /// Window radius in chunks around the viewer's chunk. Default: 3.
    pub render_distance: i64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            render_distance: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Streamer
// ---------------------------------------------------------------------------

/// Owns the materialized chunk surfaces and drives their lifecycle.
///
/// Holds exactly one surface handle per materialized chunk. All changes go
/// through [`update`](Self::update), which runs once per simulation tick.
#[derive(Debug)]
pub struct ChunkStreamer {
    config: StreamConfig,
    /// Live surface per materialized chunk.
    surfaces: FxHashMap<ChunkCoord, SurfaceHandle>,
}

impl ChunkStreamer {
    /// Create a streamer with no materialized surfaces.
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            surfaces: FxHashMap::default(),
        }
    }

    /// Run one streaming pass.
    ///
    /// Does nothing until the first snapshot has loaded. Otherwise, in order:
    /// rebuild chunks marked dirty (a dirty chunk that left the cache loses
    /// its surface immediately), materialize cached chunks inside the
    /// viewer's window, then evict surfaces outside it.
    pub fn update(&mut self, world: &mut WorldState, viewer: DVec3, renderer: &mut dyn Renderer) {
        if !world.is_loaded() {
            return;
        }
        let viewer_chunk = ChunkCoord::containing_view(viewer, self.config.chunk_size);

        // Rebuild dirty chunks
        for coord in world.drain_dirty() {
            if world.contains_chunk(coord) {
                self.build(coord, world, renderer);
            } else if let Some(old) = self.surfaces.remove(&coord) {
                renderer.destroy_surface(old);
            }
        }

        // Materialize cached chunks inside the window
        for dx in -self.config.render_distance..=self.config.render_distance {
            for dz in -self.config.render_distance..=self.config.render_distance {
                let coord = ChunkCoord::new(viewer_chunk.x + dx, viewer_chunk.z + dz);
                if world.contains_chunk(coord) && !self.surfaces.contains_key(&coord) {
                    self.build(coord, world, renderer);
                }
            }
        }

        // Evict surfaces outside the window
        let far: Vec<ChunkCoord> = self
            .surfaces
            .keys()
            .copied()
            .filter(|coord| coord.chebyshev(viewer_chunk) > self.config.render_distance)
            .collect();
        for coord in far {
            if let Some(handle) = self.surfaces.remove(&coord) {
                renderer.destroy_surface(handle);
            }
        }
    }

    /// Build (or rebuild) the surface for one cached chunk.
    ///
    /// On rebuild the replacement surface goes up before the old handle
    /// comes down.
    fn build(&mut self, coord: ChunkCoord, world: &WorldState, renderer: &mut dyn Renderer) {
        let Some(blocks) = world.chunk_blocks(coord) else {
            return;
        };
        let mesh = chunk_mesh(blocks);
        let handle = renderer.build_surface(&mesh);
        if let Some(old) = self.surfaces.insert(coord, handle) {
            renderer.destroy_surface(old);
        }
    }

    /// Coordinates that currently have a built surface.
    pub fn materialized(&self) -> FxHashSet<ChunkCoord> {
        self.surfaces.keys().copied().collect()
    }

    /// Whether a chunk currently has a built surface.
    pub fn is_materialized(&self, coord: ChunkCoord) -> bool {
        self.surfaces.contains_key(&coord)
    }

    /// Number of materialized surfaces.
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
