//! Host renderer interface consumed by the streaming and collider passes.

use cobble_world::BlockPos;

use crate::mesh::SurfaceMesh;

/// Opaque handle to a drawable chunk surface owned by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Opaque handle to a physical collider proxy owned by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyHandle(pub u64);

/// What the synchronization core asks of its host.
///
/// The core decides *when* surfaces and collider proxies exist; the host
/// decides how they are realized (GPU buffers, physics bodies, or nothing at
/// all in a headless run). Handles are minted by the host and never reused
/// while live.
pub trait Renderer {
    /// Upload a chunk surface, returning a handle for later destruction.
    fn build_surface(&mut self, mesh: &SurfaceMesh) -> SurfaceHandle;

    /// Tear down a previously built surface.
    fn destroy_surface(&mut self, handle: SurfaceHandle);

    /// Create a physical collider proxy at a block position.
    fn create_physical_proxy(&mut self, position: BlockPos) -> ProxyHandle;

    /// Tear down a previously created collider proxy.
    fn destroy_physical_proxy(&mut self, handle: ProxyHandle);
}

/// A single renderer invocation, as recorded by [`RecordingRenderer`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RenderCall {
    BuildSurface(SurfaceHandle),
    DestroySurface(SurfaceHandle),
    CreateProxy(ProxyHandle, BlockPos),
    DestroyProxy(ProxyHandle),
}

/// Test renderer that records every call and tracks which handles are live.
///
/// Destroying a handle that is not live panics, so tests catch double
/// destroys and destroys of never-built handles.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    next_surface: u64,
    next_proxy: u64,
    pub(crate) calls: Vec<RenderCall>,
    meshes: rustc_hash::FxHashMap<SurfaceHandle, SurfaceMesh>,
    proxies: rustc_hash::FxHashMap<ProxyHandle, BlockPos>,
}

#[cfg(test)]
impl RecordingRenderer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn live_surface_count(&self) -> usize {
        self.meshes.len()
    }

    pub(crate) fn live_proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// Positions of all live collider proxies.
    pub(crate) fn live_proxy_positions(&self) -> rustc_hash::FxHashSet<BlockPos> {
        self.proxies.values().copied().collect()
    }

    /// The mesh behind a live surface handle.
    pub(crate) fn surface_mesh(&self, handle: SurfaceHandle) -> Option<&SurfaceMesh> {
        self.meshes.get(&handle)
    }

    /// Forget recorded calls, keeping live handles.
    pub(crate) fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

#[cfg(test)]
impl Renderer for RecordingRenderer {
    fn build_surface(&mut self, mesh: &SurfaceMesh) -> SurfaceHandle {
        self.next_surface += 1;
        let handle = SurfaceHandle(self.next_surface);
        self.meshes.insert(handle, mesh.clone());
        self.calls.push(RenderCall::BuildSurface(handle));
        handle
    }

    fn destroy_surface(&mut self, handle: SurfaceHandle) {
        assert!(
            self.meshes.remove(&handle).is_some(),
            "destroyed surface {handle:?} that was not live"
        );
        self.calls.push(RenderCall::DestroySurface(handle));
    }

    fn create_physical_proxy(&mut self, position: BlockPos) -> ProxyHandle {
        self.next_proxy += 1;
        let handle = ProxyHandle(self.next_proxy);
        self.proxies.insert(handle, position);
        self.calls.push(RenderCall::CreateProxy(handle, position));
        handle
    }

    fn destroy_physical_proxy(&mut self, handle: ProxyHandle) {
        assert!(
            self.proxies.remove(&handle).is_some(),
            "destroyed proxy {handle:?} that was not live"
        );
        self.calls.push(RenderCall::DestroyProxy(handle));
    }
}
