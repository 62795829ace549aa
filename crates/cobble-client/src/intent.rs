//! Intent emission: translate local player actions into outgoing messages.
//!
//! Intents are fire-and-forget. Nothing is applied locally; the world only
//! changes when the authority's next snapshot arrives.

use glam::{DVec3, I64Vec3};

use cobble_proto::{Message, PlaceBlock, RemoveBlock, UpdatePos};
use cobble_world::{BlockPos, ChunkCoord};

use crate::transport::{ConnectionLost, MessageSender};

/// Emits player intents onto the outgoing queue.
#[derive(Debug, Clone)]
pub struct IntentSender {
    sender: MessageSender,
    chunk_size: i64,
}

impl IntentSender {
    /// Create an intent sender that attributes chunks using `chunk_size`.
    pub fn new(sender: MessageSender, chunk_size: i64) -> Self {
        Self { sender, chunk_size }
    }

    /// Report the viewer's current position.
    pub fn report_position(&self, position: DVec3) -> Result<(), ConnectionLost> {
        self.sender.send(Message::UpdatePos(UpdatePos {
            position: (position.x, position.y, position.z),
        }))
    }

    /// Ask the authority to place a block against the face of `hit`.
    ///
    /// The new block goes at `hit` offset by the face `normal`; the chunk in
    /// the message is the one containing that target position, which can
    /// differ from the hit block's chunk at a seam.
    pub fn place_block(&self, hit: BlockPos, normal: I64Vec3) -> Result<(), ConnectionLost> {
        let target = hit.offset(normal);
        self.sender.send(Message::PlaceBlock(PlaceBlock {
            position: target,
            chunk: ChunkCoord::containing(target, self.chunk_size),
        }))
    }

    /// Ask the authority to remove the block at `target`.
    pub fn remove_block(&self, target: BlockPos) -> Result<(), ConnectionLost> {
        self.sender.send(Message::RemoveBlock(RemoveBlock {
            position: target,
            chunk: ChunkCoord::containing(target, self.chunk_size),
        }))
    }
}
