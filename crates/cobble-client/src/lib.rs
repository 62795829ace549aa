//! Client-side synchronization core: transport, surface streaming, collider
//! lifecycle, and intent emission for a server-authoritative voxel world.

pub mod collider;
pub mod intent;
pub mod mesh;
pub mod renderer;
pub mod session;
pub mod streaming;
pub mod transport;

pub use collider::{ColliderConfig, ColliderManager};
pub use intent::IntentSender;
pub use mesh::{INDICES_PER_BLOCK, SurfaceMesh, VERTICES_PER_BLOCK, chunk_mesh};
pub use renderer::{ProxyHandle, Renderer, SurfaceHandle};
pub use session::{ClientConfig, ClientSession, TICK_DURATION, TICK_RATE};
pub use streaming::{ChunkStreamer, StreamConfig};
pub use transport::{
    Connection, ConnectionLost, ConnectionState, ConnectionStateWatch, MessageHandler,
    MessageSender,
};
