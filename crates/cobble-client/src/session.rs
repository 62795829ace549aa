//! Client session: one connection, one world cache, and the per-tick
//! pipeline that keeps surfaces and colliders in step with both.
//!
//! The receive task applies snapshots to the cache as they arrive; the host
//! calls [`ClientSession::tick`] at [`TICK_RATE`] to report the viewer
//! position and run the streaming and collider passes against whatever the
//! cache currently holds.

use std::net::SocketAddr;
use std::time::Duration;

use glam::DVec3;

use cobble_proto::{FrameConfig, Message};
use cobble_world::SharedWorld;

use crate::collider::{ColliderConfig, ColliderManager};
use crate::intent::IntentSender;
use crate::renderer::Renderer;
use crate::streaming::{ChunkStreamer, StreamConfig};
use crate::transport::{Connection, ConnectionLost, ConnectionState};

/// Simulation ticks per second.
pub const TICK_RATE: u32 = 60;

/// Duration of one simulation tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Configuration for a client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address to connect to.
    pub server_addr: SocketAddr,
    /// Blocks per chunk edge on the horizontal axes.
    pub chunk_size: i64,
    /// Surface window radius in chunks.
    pub render_distance: i64,
    /// Collider window radius in blocks.
    pub interaction_radius: f64,
    /// Framing limits for the wire connection.
    pub frame: FrameConfig,
}

impl ClientConfig {
    /// Defaults for everything but the address.
    pub fn new(server_addr: SocketAddr) -> Self {
        Self {
            server_addr,
            chunk_size: 16,
            render_distance: 3,
            interaction_radius: 5.0,
            frame: FrameConfig::default(),
        }
    }
}

/// A connected synchronization session.
///
/// Owns the world cache, the connection, and the streaming and collider
/// state. Dropping the session leaves the background tasks to wind down on
/// their own; call [`close`](Self::close) for an orderly exit.
pub struct ClientSession {
    world: SharedWorld,
    connection: Connection,
    streamer: ChunkStreamer,
    colliders: ColliderManager,
    intents: IntentSender,
}

impl ClientSession {
    /// Connect to the server and wire the receive task into the world cache.
    pub async fn connect(config: ClientConfig) -> std::io::Result<Self> {
        let world = SharedWorld::new();
        let recv_world = world.clone();
        let connection = Connection::connect(
            config.server_addr,
            config.frame.clone(),
            move |msg: Message| apply_incoming(&recv_world, msg),
        )
        .await?;

        let intents = IntentSender::new(connection.sender(), config.chunk_size);
        let streamer = ChunkStreamer::new(StreamConfig {
            chunk_size: config.chunk_size,
            render_distance: config.render_distance,
        });
        let colliders = ColliderManager::new(ColliderConfig {
            interaction_radius: config.interaction_radius,
        });

        Ok(Self {
            world,
            connection,
            streamer,
            colliders,
            intents,
        })
    }

    /// Run one simulation tick for a viewer at `viewer`.
    ///
    /// Until the first snapshot arrives this is a no-op: nothing is sent and
    /// the renderer is never called. Afterwards each tick reports the viewer
    /// position, then runs the streaming pass and the collider pass. Returns
    /// an error once the connection is gone.
    pub fn tick(
        &mut self,
        viewer: DVec3,
        renderer: &mut dyn Renderer,
    ) -> Result<(), ConnectionLost> {
        if self.connection.state().current() == ConnectionState::Disconnected {
            return Err(ConnectionLost);
        }
        if !self.world.is_loaded() {
            return Ok(());
        }
        self.intents.report_position(viewer)?;

        let mut world = self.world.write();
        self.streamer.update(&mut world, viewer, renderer);
        let materialized = self.streamer.materialized();
        self.colliders.update(&world, &materialized, viewer, renderer);
        Ok(())
    }

    /// Shared handle to the world cache.
    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    /// Sender for player intents.
    pub fn intents(&self) -> &IntentSender {
        &self.intents
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state().current()
    }

    /// Whether the connection is still up.
    pub fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }

    /// Number of materialized chunk surfaces.
    pub fn surface_count(&self) -> usize {
        self.streamer.surface_count()
    }

    /// Number of live collider proxies.
    pub fn proxy_count(&self) -> usize {
        self.colliders.proxy_count()
    }

    /// Close the connection.
    pub fn close(&self) {
        self.connection.close();
    }
}

/// Apply one inbound message to the world cache.
///
/// Runs on the receive task. Snapshots replace the cache; anything else the
/// server has no business sending is logged and dropped.
fn apply_incoming(world: &SharedWorld, msg: Message) {
    match msg {
        Message::Snapshot(snapshot) => world.apply_snapshot(snapshot),
        other => {
            tracing::warn!(kind = other.kind(), "ignoring unexpected server message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    use cobble_proto::{
        PlaceBlock, UpdatePos, deserialize_message, read_frame, serialize_message, write_frame,
    };
    use cobble_world::{BlockPos, ChunkCoord, PlayerId, WorldSnapshot};
    use glam::I64Vec3;

    use crate::renderer::RecordingRenderer;

    /// Serve one client: send `outgoing` first, then forward every message
    /// the client sends into the returned channel.
    async fn serve(outgoing: Vec<Message>) -> (SocketAddr, mpsc::UnboundedReceiver<Message>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let config = FrameConfig::default();
            for msg in &outgoing {
                let payload = serialize_message(msg).unwrap();
                write_frame(&mut stream, &payload, &config).await.unwrap();
            }
            while let Ok(payload) = read_frame(&mut stream, &config).await {
                let msg = deserialize_message(&payload).unwrap();
                if tx.send(msg).is_err() {
                    break;
                }
            }
        });
        (addr, rx)
    }

    /// Poll `f` until it returns true or five seconds pass.
    async fn wait_until(mut f: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !f() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    fn one_chunk_snapshot() -> Message {
        Message::Snapshot(
            WorldSnapshot::new()
                .with_chunk(ChunkCoord::new(0, 0), [BlockPos::new(1, 1, 1)])
                .with_player(PlayerId(2), [8.0, 10.0, 8.0]),
        )
    }

    #[tokio::test]
    async fn test_tick_is_inert_before_first_snapshot() {
        let (addr, mut from_client) = serve(vec![]).await;
        let mut session = ClientSession::connect(ClientConfig::new(addr)).await.unwrap();
        let mut renderer = RecordingRenderer::new();

        for _ in 0..3 {
            session
                .tick(DVec3::new(0.0, 10.0, 0.0), &mut renderer)
                .unwrap();
        }

        assert!(renderer.calls.is_empty());
        assert_eq!(session.surface_count(), 0);
        // Nothing was sent either, not even a position report.
        let nothing = tokio::time::timeout(Duration::from_millis(200), from_client.recv()).await;
        assert!(nothing.is_err(), "client sent a message before load");
    }

    #[tokio::test]
    async fn test_snapshot_drives_surfaces_colliders_and_position_report() {
        let (addr, mut from_client) = serve(vec![one_chunk_snapshot()]).await;
        let mut session = ClientSession::connect(ClientConfig::new(addr)).await.unwrap();
        let mut renderer = RecordingRenderer::new();

        wait_until(|| session.world().is_loaded()).await;
        session
            .tick(DVec3::new(0.0, 10.0, 0.0), &mut renderer)
            .unwrap();

        assert_eq!(session.surface_count(), 1);
        assert_eq!(renderer.live_surface_count(), 1);
        // (1,1,1) is within reach of the ground anchor at the origin.
        assert_eq!(session.proxy_count(), 1);
        assert!(session.world().read().players().contains_key(&PlayerId(2)));

        let report = tokio::time::timeout(Duration::from_secs(5), from_client.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            report,
            Message::UpdatePos(UpdatePos {
                position: (0.0, 10.0, 0.0),
            })
        );
    }

    #[tokio::test]
    async fn test_every_tick_reports_position() {
        let (addr, mut from_client) = serve(vec![one_chunk_snapshot()]).await;
        let mut session = ClientSession::connect(ClientConfig::new(addr)).await.unwrap();
        let mut renderer = RecordingRenderer::new();

        wait_until(|| session.world().is_loaded()).await;
        for x in 0..3 {
            session
                .tick(DVec3::new(x as f64, 10.0, 0.0), &mut renderer)
                .unwrap();
        }

        for x in 0..3 {
            let msg = tokio::time::timeout(Duration::from_secs(5), from_client.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(
                msg,
                Message::UpdatePos(UpdatePos {
                    position: (x as f64, 10.0, 0.0),
                })
            );
        }
    }

    #[tokio::test]
    async fn test_intents_reach_the_server() {
        let (addr, mut from_client) = serve(vec![one_chunk_snapshot()]).await;
        let session = ClientSession::connect(ClientConfig::new(addr)).await.unwrap();

        wait_until(|| session.world().is_loaded()).await;
        session
            .intents()
            .place_block(BlockPos::new(1, 1, 1), I64Vec3::new(0, 1, 0))
            .unwrap();

        let msg = tokio::time::timeout(Duration::from_secs(5), from_client.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            msg,
            Message::PlaceBlock(PlaceBlock {
                position: BlockPos::new(1, 2, 1),
                chunk: ChunkCoord::new(0, 0),
            })
        );
    }

    #[tokio::test]
    async fn test_later_snapshot_rebuilds_through_the_tick() {
        let first = one_chunk_snapshot();
        let second = Message::Snapshot(
            WorldSnapshot::new()
                .with_chunk(
                    ChunkCoord::new(0, 0),
                    [BlockPos::new(1, 1, 1), BlockPos::new(2, 1, 1)],
                )
                .with_player(PlayerId(2), [8.0, 10.0, 8.0]),
        );
        let (addr, _from_client) = serve(vec![first, second]).await;
        let mut session = ClientSession::connect(ClientConfig::new(addr)).await.unwrap();
        let mut renderer = RecordingRenderer::new();

        // Both snapshots race the first tick; wait until the second landed.
        wait_until(|| {
            session
                .world()
                .read()
                .chunk_blocks(ChunkCoord::new(0, 0))
                .is_some_and(|blocks| blocks.len() == 2)
        })
        .await;
        session
            .tick(DVec3::new(0.0, 10.0, 0.0), &mut renderer)
            .unwrap();

        assert_eq!(session.surface_count(), 1);
        assert_eq!(renderer.live_surface_count(), 1);
        assert_eq!(session.proxy_count(), 2);
    }

    #[tokio::test]
    async fn test_interaction_radius_does_not_reach_past_streamed_chunks() {
        // A collider radius far wider than the surface window still only
        // draws proxies from chunks the streamer has materialized.
        let snapshot = Message::Snapshot(
            WorldSnapshot::new()
                .with_chunk(ChunkCoord::new(0, 0), [BlockPos::new(1, 1, 1)])
                .with_chunk(ChunkCoord::new(3, 3), [BlockPos::new(48, 1, 48)]),
        );
        let (addr, _from_client) = serve(vec![snapshot]).await;
        let mut config = ClientConfig::new(addr);
        config.render_distance = 1;
        config.interaction_radius = 100.0;
        let mut session = ClientSession::connect(config).await.unwrap();
        let mut renderer = RecordingRenderer::new();

        wait_until(|| session.world().is_loaded()).await;
        session
            .tick(DVec3::new(0.0, 10.0, 0.0), &mut renderer)
            .unwrap();

        // (48,1,48) is well inside the 100-block radius but chunk (3,3) is
        // outside the window, so only the near block gets a proxy.
        assert_eq!(session.surface_count(), 1);
        assert_eq!(session.proxy_count(), 1);
        assert!(
            renderer
                .live_proxy_positions()
                .contains(&BlockPos::new(1, 1, 1))
        );
    }

    #[tokio::test]
    async fn test_connection_loss_surfaces_in_tick() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let payload = serialize_message(&one_chunk_snapshot()).unwrap();
            write_frame(&mut stream, &payload, &FrameConfig::default())
                .await
                .unwrap();
            // Hang up after the first snapshot.
        });

        let mut session = ClientSession::connect(ClientConfig::new(addr)).await.unwrap();
        let mut renderer = RecordingRenderer::new();

        wait_until(|| session.world().is_loaded()).await;
        wait_until(|| !session.is_connected()).await;

        assert_eq!(
            session.tick(DVec3::new(0.0, 10.0, 0.0), &mut renderer),
            Err(ConnectionLost)
        );
    }

    #[tokio::test]
    async fn test_close_makes_next_tick_fail() {
        let (addr, _from_client) = serve(vec![one_chunk_snapshot()]).await;
        let mut session = ClientSession::connect(ClientConfig::new(addr)).await.unwrap();
        let mut renderer = RecordingRenderer::new();

        wait_until(|| session.world().is_loaded()).await;
        session.close();

        assert!(!session.is_connected());
        assert_eq!(
            session.tick(DVec3::new(0.0, 10.0, 0.0), &mut renderer),
            Err(ConnectionLost)
        );
    }
}
