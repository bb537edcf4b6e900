//! Headless window: a view task mirroring the owner's state.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::bridge::{Dispatcher, ViewBridge, ViewEndpoint};
use crate::effects::ViewSurface;
use crate::reducers::{Action, AppState, VisibleId};
use crate::view_store::{BootstrapMode, ViewStore};

/// A window surface whose "renderer" is a [`ViewStore`] task.
///
/// The task talks to the owner only through its endpoint, exactly as a view
/// in another process would.
pub struct Window {
    id: VisibleId,
    path: String,
    endpoint: ViewEndpoint,
    bootstrap: BootstrapMode,
    instance: Mutex<Option<Instance>>,
    dispatch: Mutex<Option<Dispatcher>>,
    focused: AtomicUsize,
}

/// One materialization of a window.
struct Instance {
    task: JoinHandle<()>,
    /// Cleared by the task itself before it reports exiting.
    alive: Arc<AtomicBool>,
}

impl Instance {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.task.is_finished()
    }
}

impl Window {
    pub fn new(id: VisibleId, endpoint: ViewEndpoint, bootstrap: BootstrapMode) -> Self {
        Self {
            id,
            path: format!("{}.html", id.as_str()),
            endpoint,
            bootstrap,
            instance: Mutex::new(None),
            dispatch: Mutex::new(None),
            focused: AtomicUsize::new(0),
        }
    }

    /// View template the window would load.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn focus_count(&self) -> usize {
        self.focused.load(Ordering::SeqCst)
    }

    fn spawn_view(&self) -> Instance {
        let id = self.id;
        let endpoint = self.endpoint.clone();
        let mode = self.bootstrap;
        let dispatch = self.dispatch.lock().clone();
        let alive = Arc::new(AtomicBool::new(true));
        let exited = Arc::clone(&alive);

        let task = tokio::spawn(async move {
            run_view(id, endpoint, mode).await;
            // Only reached when the view ends by itself; destroy and close
            // abort the task instead.
            exited.store(false, Ordering::SeqCst);
            tracing::info!(window = %id, "Window exited");
            if let Some(dispatch) = dispatch {
                dispatch.dispatch_intent(&Action::surface_destroyed(id));
            }
        });
        Instance { task, alive }
    }

    /// Abort the current instance. Returns whether it was still alive.
    fn teardown(&self) -> bool {
        let Some(instance) = self.instance.lock().take() else {
            return false;
        };
        let was_alive = instance.is_alive();
        instance.task.abort();
        was_alive
    }
}

async fn run_view(id: VisibleId, endpoint: ViewEndpoint, mode: BootstrapMode) {
    let bridge = ViewBridge::<AppState, Action>::new(endpoint.clone());
    let mut view = match ViewStore::attach(bridge, mode).await {
        Ok(view) => view,
        Err(error) => {
            tracing::warn!(window = %id, %error, "Window failed to bootstrap");
            return;
        }
    };
    if view.is_ready() {
        render(id, view.revision(), &view.state());
    }
    loop {
        tokio::select! {
            changed = view.changed() => match changed {
                Ok(state) => render(id, view.revision(), &state),
                Err(_) => break,
            },
            _ = endpoint.closed() => break,
        }
    }
}

fn render(id: VisibleId, revision: Option<u64>, state: &AppState) {
    tracing::debug!(
        window = %id,
        revision,
        counter = state.counter,
        to_dos = state.to_dos.items.len(),
        "Window rendered state"
    );
}

impl ViewSurface for Window {
    fn id(&self) -> VisibleId {
        self.id
    }

    fn create(&self) {
        let mut instance = self.instance.lock();
        if instance.as_ref().is_some_and(Instance::is_alive) {
            return;
        }
        tracing::info!(window = %self.id, path = %self.path, "Creating window");
        *instance = Some(self.spawn_view());
    }

    fn destroy(&self) {
        if self.teardown() {
            tracing::info!(window = %self.id, "Destroyed window");
        }
    }

    fn close(&self) {
        if !self.teardown() {
            return;
        }
        tracing::info!(window = %self.id, "Window closed by user");
        if let Some(dispatch) = self.dispatch.lock().as_ref() {
            dispatch.dispatch_intent(&Action::surface_destroyed(self.id));
        }
    }

    fn focus(&self) {
        self.focused.fetch_add(1, Ordering::SeqCst);
        tracing::info!(window = %self.id, "Focused window");
    }

    fn is_visible(&self) -> bool {
        self.instance.lock().as_ref().is_some_and(Instance::is_alive)
    }

    fn set_dispatch(&self, dispatch: Dispatcher) {
        *self.dispatch.lock() = Some(dispatch);
    }
}
