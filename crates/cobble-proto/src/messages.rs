//! The message vocabulary shared by client and server.
//!
//! A payload on the wire is one version byte followed by a
//! postcard-encoded [`Message`]. The version byte sits outside the encoded
//! body so either side can reject a speaker of the wrong protocol without
//! attempting to decode it. [`serialize_message`] and [`deserialize_message`]
//! are the only two ways bytes and messages convert.

use serde::{Deserialize, Serialize};

use cobble_world::{BlockPos, ChunkCoord, WorldSnapshot};

/// Version byte prepended to every payload. Bump on any wire change.
pub const PROTOCOL_VERSION: u8 = 1;

/// Everything that can cross the wire, in either direction.
///
/// The server only ever sends [`Snapshot`](Message::Snapshot); the other
/// variants are client intents, sent without expecting a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Message {
    /// Server pushes a complete image of the world.
    Snapshot(WorldSnapshot),
    /// Client reports its current position.
    UpdatePos(UpdatePos),
    /// Client asks to place a block.
    PlaceBlock(PlaceBlock),
    /// Client asks to remove a block.
    RemoveBlock(RemoveBlock),
}

impl Message {
    /// Short variant name, for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Snapshot(_) => "snapshot",
            Message::UpdatePos(_) => "update_pos",
            Message::PlaceBlock(_) => "place_block",
            Message::RemoveBlock(_) => "remove_block",
        }
    }
}

/// Position report from the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdatePos {
    /// Viewer position in world units.
    pub position: (f64, f64, f64),
}

/// Block placement request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceBlock {
    /// Position the new block should occupy.
    pub position: BlockPos,
    /// Chunk containing that position.
    pub chunk: ChunkCoord,
}

/// Block removal request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveBlock {
    /// Position of the block to remove.
    pub position: BlockPos,
    /// Chunk containing that position.
    pub chunk: ChunkCoord,
}

/// Ways an inbound payload can fail to become a [`Message`].
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The payload had no bytes at all, not even a version.
    #[error("zero-length payload")]
    EmptyPayload,

    /// The version byte named a protocol this build does not speak.
    #[error("protocol version {0} is not supported")]
    UnsupportedVersion(u8),

    /// The body was not a valid postcard encoding of [`Message`].
    #[error("postcard decode failed: {0}")]
    Postcard(#[from] postcard::Error),
}

/// Encode a [`Message`] as a versioned payload.
pub fn serialize_message(msg: &Message) -> Result<Vec<u8>, postcard::Error> {
    let mut wire = vec![PROTOCOL_VERSION];
    wire.extend(postcard::to_allocvec(msg)?);
    Ok(wire)
}

/// Decode a versioned payload back into a [`Message`].
pub fn deserialize_message(data: &[u8]) -> Result<Message, MessageError> {
    let (version, body) = data.split_first().ok_or(MessageError::EmptyPayload)?;
    if *version != PROTOCOL_VERSION {
        return Err(MessageError::UnsupportedVersion(*version));
    }
    Ok(postcard::from_bytes(body)?)
}
