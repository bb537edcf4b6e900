//! Headless tray icon.

use parking_lot::Mutex;

use crate::bridge::Dispatcher;
use crate::effects::ViewSurface;
use crate::reducers::{Action, AppState, VisibleId};

#[derive(Default)]
struct TrayInner {
    shown: bool,
    tooltip: String,
}

/// Tray surface. Lives in the owner and reads state directly from the store
/// through [`Tray::update`]; it never focuses.
#[derive(Default)]
pub struct Tray {
    inner: Mutex<TrayInner>,
    dispatch: Mutex<Option<Dispatcher>>,
}

impl Tray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the tooltip. Called from a store listener on every commit.
    pub fn update(&self, state: &AppState) {
        let tooltip = tooltip(state);
        let mut inner = self.inner.lock();
        if inner.shown && inner.tooltip != tooltip {
            tracing::debug!(%tooltip, "Tray updated");
        }
        inner.tooltip = tooltip;
    }

    /// Hide the icon. Returns whether it was shown.
    fn hide(&self) -> bool {
        let mut inner = self.inner.lock();
        std::mem::replace(&mut inner.shown, false)
    }

    /// Tooltip while shown.
    pub fn tooltip(&self) -> Option<String> {
        let inner = self.inner.lock();
        inner.shown.then(|| inner.tooltip.clone())
    }
}

fn tooltip(state: &AppState) -> String {
    format!(
        "counter: {}, to-dos: {}/{}",
        state.counter,
        state.to_dos.completed(),
        state.to_dos.items.len()
    )
}

impl ViewSurface for Tray {
    fn id(&self) -> VisibleId {
        VisibleId::Tray
    }

    fn create(&self) {
        let mut inner = self.inner.lock();
        if inner.shown {
            return;
        }
        inner.shown = true;
        tracing::info!(tooltip = %inner.tooltip, "Created tray");
    }

    fn destroy(&self) {
        if self.hide() {
            tracing::info!("Destroyed tray");
        }
    }

    fn close(&self) {
        if !self.hide() {
            return;
        }
        tracing::info!("Tray closed by user");
        if let Some(dispatch) = self.dispatch.lock().as_ref() {
            dispatch.dispatch_intent(&Action::surface_destroyed(VisibleId::Tray));
        }
    }

    fn is_visible(&self) -> bool {
        self.inner.lock().shown
    }

    fn set_dispatch(&self, dispatch: Dispatcher) {
        *self.dispatch.lock() = Some(dispatch);
    }
}
