//! View surfaces (windows, tray) and the registry that owns them.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bridge::Dispatcher;
use crate::reducers::VisibleId;

/// Lifecycle contract of a logical view surface.
///
/// Implementations must be idempotent: `create` on a materialized surface and
/// `destroy` on an absent one do nothing. `create` must not block on the
/// materialization it starts.
pub trait ViewSurface: Send + Sync {
    fn id(&self) -> VisibleId;

    fn create(&self);

    /// Tear the surface down because the state no longer lists it. Nothing
    /// is reported, the visible set already says so.
    fn destroy(&self);

    /// Tear the surface down from outside the state machine (a user close)
    /// and report it through the installed dispatcher, so the visible set
    /// catches up.
    fn close(&self);

    /// Bring to front. Surfaces without a notion of focus ignore it.
    fn focus(&self) {}

    fn is_visible(&self) -> bool;

    fn set_dispatch(&self, dispatch: Dispatcher);
}

/// Explicit registry of every surface the owner can materialize.
///
/// Surfaces may be registered after the registry is shared, which lets the
/// store (holding the router) exist before the surfaces that need its bridge.
#[derive(Default)]
pub struct SurfaceRegistry {
    surfaces: RwLock<BTreeMap<VisibleId, Arc<dyn ViewSurface>>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface under its own id, replacing any previous one.
    pub fn register(&self, surface: Arc<dyn ViewSurface>) {
        self.surfaces.write().insert(surface.id(), surface);
    }

    pub fn get(&self, id: VisibleId) -> Option<Arc<dyn ViewSurface>> {
        self.surfaces.read().get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<VisibleId> {
        self.surfaces.read().keys().copied().collect()
    }

    /// Give every surface the capability to emit intents.
    pub fn set_dispatch(&self, dispatch: &Dispatcher) {
        for surface in self.snapshot() {
            surface.set_dispatch(dispatch.clone());
        }
    }

    /// Destroy every materialized surface. Called once at process exit.
    pub fn teardown(&self) {
        for surface in self.snapshot() {
            if surface.is_visible() {
                tracing::info!(surface = %surface.id(), "Tearing down surface");
                surface.destroy();
            }
        }
    }

    /// Surfaces are called without the lock held, since a surface may
    /// re-enter the registry.
    fn snapshot(&self) -> Vec<Arc<dyn ViewSurface>> {
        self.surfaces.read().values().cloned().collect()
    }
}
