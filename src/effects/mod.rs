//! Side-effect router: turns committed visibility changes into surface
//! lifecycle calls.

mod surface;

use std::sync::Arc;

use crate::reducers::{Action, AppReducer, AppState, VisibleId};
use crate::store::{Middleware, Next, Store};

pub use surface::{SurfaceRegistry, ViewSurface};

/// What a slot handler did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    Create,
    Destroy,
    Focus,
}

/// Middleware driving surfaces from state.
///
/// Intercepts only add/remove/toggle-visible intents naming a registered
/// slot, and drops destroy notifications for surfaces that are live again. The intent is reduced first; the handler then reads the committed
/// state, so it acts on the post-transition visible set.
pub struct SideEffectRouter {
    registry: Arc<SurfaceRegistry>,
}

impl SideEffectRouter {
    pub fn new(registry: Arc<SurfaceRegistry>) -> Self {
        Self { registry }
    }

    /// Bring one slot in line with `state`.
    ///
    /// Materialization is read right before acting, so a surface that was
    /// destroyed or created concurrently turns the call into a no-op or a
    /// focus rather than a duplicate.
    pub fn apply(&self, slot: VisibleId, state: &AppState) -> Option<SurfaceOp> {
        let surface = self.registry.get(slot)?;
        let should_be_visible = state.settings.is_visible(slot);

        let op = match (should_be_visible, surface.is_visible()) {
            (false, true) => {
                surface.destroy();
                SurfaceOp::Destroy
            }
            (true, false) => {
                surface.create();
                SurfaceOp::Create
            }
            (true, true) => {
                surface.focus();
                SurfaceOp::Focus
            }
            (false, false) => return None,
        };
        tracing::debug!(surface = %slot, op = ?op, "Applied surface side effect");
        Some(op)
    }

    /// Run every registered slot handler against `state`.
    pub fn sync_all(&self, state: &AppState) -> Vec<(VisibleId, SurfaceOp)> {
        self.registry
            .ids()
            .into_iter()
            .filter_map(|slot| self.apply(slot, state).map(|op| (slot, op)))
            .collect()
    }
}

impl Middleware<AppReducer> for SideEffectRouter {
    fn handle(&self, store: &Store<AppReducer>, intent: Action, next: Next<'_, AppReducer>) {
        if let Some(slot) = intent.destroyed_slot() {
            // A surface materialized again since it reported its destruction.
            if self.registry.get(slot).is_some_and(|surface| surface.is_visible()) {
                tracing::debug!(surface = %slot, "Dropped stale destroy notification");
                return;
            }
        }

        let Some(slot) = intent
            .visibility_slot()
            .filter(|slot| self.registry.get(*slot).is_some())
        else {
            return next.run(intent);
        };

        next.run(intent);
        let state = store.get_state();
        self.apply(slot, &state);
    }
}
