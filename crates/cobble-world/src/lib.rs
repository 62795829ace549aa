//! World-state cache for a synchronized voxel world: coordinate types,
//! snapshot images, and dirty-region tracking.

pub mod coords;
pub mod snapshot;
pub mod state;

pub use coords::{BlockPos, ChunkCoord};
pub use snapshot::{PlayerId, PlayerState, WorldSnapshot};
pub use state::{DirtyTracker, SharedWorld, WorldState};
