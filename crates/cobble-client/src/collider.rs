//! Collider proxy lifecycle: invisible physical stand-ins for blocks within
//! arm's reach of the viewer.
//!
//! Proxies exist independently of chunk surfaces. Their population is drawn
//! from chunks that are both materialized and still cached, then filtered by
//! Euclidean distance to the viewer's ground anchor.

use glam::DVec3;
use rustc_hash::{FxHashMap, FxHashSet};

use cobble_world::{BlockPos, ChunkCoord, WorldState};

use crate::renderer::{ProxyHandle, Renderer};

/// Configuration for the collider window.
#[derive(Debug, Clone)]
pub struct ColliderConfig {
    /// Maximum Euclidean distance from the viewer anchor to a proxied block.
    /// Default: 5.0.
    pub interaction_radius: f64,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            interaction_radius: 5.0,
        }
    }
}

/// Owns the live collider proxies and drives their lifecycle.
#[derive(Debug)]
pub struct ColliderManager {
    config: ColliderConfig,
    /// Live proxy per block position.
    proxies: FxHashMap<BlockPos, ProxyHandle>,
}

impl ColliderManager {
    /// Create a manager with no live proxies.
    pub fn new(config: ColliderConfig) -> Self {
        Self {
            config,
            proxies: FxHashMap::default(),
        }
    }

    /// Run one collider pass.
    ///
    /// Does nothing until the first snapshot has loaded. The distance anchor
    /// is the viewer's x/z rounded to the nearest block at ground level, so
    /// a block's own height counts against the radius. A proxy is destroyed
    /// when its block leaves the radius or vanishes from the materialized
    /// part of the cache.
    pub fn update(
        &mut self,
        world: &WorldState,
        materialized: &FxHashSet<ChunkCoord>,
        viewer: DVec3,
        renderer: &mut dyn Renderer,
    ) {
        if !world.is_loaded() {
            return;
        }
        let anchor = DVec3::new(viewer.x.round(), 0.0, viewer.z.round());

        let mut eligible: FxHashSet<BlockPos> = FxHashSet::default();
        for &coord in materialized {
            if let Some(blocks) = world.chunk_blocks(coord) {
                eligible.extend(blocks.iter().copied());
            }
        }

        // Create missing proxies within reach
        for &pos in &eligible {
            if !self.proxies.contains_key(&pos) && self.within_reach(pos, anchor) {
                let handle = renderer.create_physical_proxy(pos);
                self.proxies.insert(pos, handle);
            }
        }

        // Destroy proxies that left reach or whose block is gone
        let stale: Vec<BlockPos> = self
            .proxies
            .keys()
            .copied()
            .filter(|&pos| !self.within_reach(pos, anchor) || !eligible.contains(&pos))
            .collect();
        for pos in stale {
            if let Some(handle) = self.proxies.remove(&pos) {
                renderer.destroy_physical_proxy(handle);
            }
        }
    }

    fn within_reach(&self, pos: BlockPos, anchor: DVec3) -> bool {
        (pos.as_dvec3() - anchor).length() <= self.config.interaction_radius
    }

    /// Whether a block currently has a live proxy.
    pub fn has_proxy(&self, pos: BlockPos) -> bool {
        self.proxies.contains_key(&pos)
    }

    /// Number of live proxies.
    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }
}
