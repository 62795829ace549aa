//! Wire protocol: length-prefixed framing and versioned message serialization.

pub mod framing;
pub mod messages;

pub use framing::{FrameConfig, FrameError, read_frame, write_frame};
pub use messages::{
    Message, MessageError, PROTOCOL_VERSION, PlaceBlock, RemoveBlock, UpdatePos,
    deserialize_message, serialize_message,
};
