//! Owner process wiring: store, router, surfaces, bridge, console.

pub mod console;
pub mod tray;
pub mod viewer;
pub mod window;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;

use crate::bridge::{BridgeSettings, Dispatcher, OwnerBridge, ViewEndpoint};
use crate::config::Config;
use crate::effects::{SideEffectRouter, SurfaceRegistry};
use crate::reducers::{AppReducer, AppState, SettingsState, VisibleId};
use crate::shutdown::ShutdownManager;
use crate::store::{LoggingMiddleware, Store, Subscription};

use console::Command;
use tray::Tray;
use window::Window;

/// Everything the owner process runs.
pub struct OwnerRuntime {
    store: Store<AppReducer>,
    registry: Arc<SurfaceRegistry>,
    windows: BTreeMap<VisibleId, Arc<Window>>,
    tray: Arc<Tray>,
    endpoint: ViewEndpoint,
    dispatcher: Dispatcher,
    bridge: Option<OwnerBridge<AppReducer>>,
    bridge_task: Option<JoinHandle<()>>,
    _tray_updates: Subscription,
}

impl OwnerRuntime {
    pub fn new(config: &Config) -> Self {
        let registry = Arc::new(SurfaceRegistry::new());
        let store = Store::builder()
            .initial_state(AppState {
                settings: SettingsState {
                    visible: config.startup.visible.clone(),
                },
                ..AppState::default()
            })
            .middleware(LoggingMiddleware)
            .middleware(SideEffectRouter::new(Arc::clone(&registry)))
            .build();

        let bridge = OwnerBridge::attach(store.clone(), BridgeSettings::from(&config.bridge));
        let endpoint = bridge.endpoint();
        let dispatcher = bridge.dispatcher();

        let windows: BTreeMap<VisibleId, Arc<Window>> = VisibleId::ALL
            .into_iter()
            .filter(|id| *id != VisibleId::Tray)
            .map(|id| {
                let window = Window::new(id, bridge.endpoint(), config.view.bootstrap);
                (id, Arc::new(window))
            })
            .collect();
        for window in windows.values() {
            registry.register(window.clone());
        }

        let tray = Arc::new(Tray::new());
        tray.update(&store.get_state());
        registry.register(tray.clone());
        let tray_updates = {
            let tray = Arc::clone(&tray);
            store.subscribe(move |committed| tray.update(&committed.state))
        };

        registry.set_dispatch(&dispatcher);

        Self {
            store,
            registry,
            windows,
            tray,
            endpoint,
            dispatcher,
            bridge: Some(bridge),
            bridge_task: None,
            _tray_updates: tray_updates,
        }
    }

    pub fn store(&self) -> &Store<AppReducer> {
        &self.store
    }

    /// In-process endpoint for an additional view.
    pub fn endpoint(&self) -> ViewEndpoint {
        self.endpoint.clone()
    }

    /// Owner-origin dispatcher; bypasses the dispatch policy.
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn window(&self, id: VisibleId) -> Option<Arc<Window>> {
        self.windows.get(&id).cloned()
    }

    pub fn tray(&self) -> Arc<Tray> {
        Arc::clone(&self.tray)
    }

    /// Spawn the bridge loop and materialize the startup surfaces.
    ///
    /// The loop runs until `shutdown` is signalled. Calling this twice does
    /// nothing the second time.
    pub fn start(&mut self, shutdown: Arc<ShutdownManager>) {
        let Some(bridge) = self.bridge.take() else {
            return;
        };
        self.bridge_task = Some(tokio::spawn(async move {
            bridge.run_until(async move { shutdown.wait().await }).await
        }));

        let router = SideEffectRouter::new(Arc::clone(&self.registry));
        for (surface, op) in router.sync_all(&self.store.get_state()) {
            tracing::info!(%surface, ?op, "Startup surface");
        }
    }

    /// Signal shutdown, wait for the bridge loop, then tear every surface down.
    pub async fn stop(mut self, shutdown: &ShutdownManager) {
        shutdown.signal();
        if let Some(task) = self.bridge_task.take() {
            if let Err(error) = task.await {
                tracing::warn!(%error, "Owner bridge task failed");
            }
        }
        self.registry.teardown();
    }

    /// Run one console command. Returns what should be printed, if anything.
    pub fn execute(&self, command: Command, shutdown: &ShutdownManager) -> Option<String> {
        match command {
            Command::Dispatch(intent) => {
                self.dispatcher.dispatch(intent);
                None
            }
            Command::After { delay, intent } => {
                let dispatcher = self.dispatcher.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    dispatcher.dispatch(intent);
                });
                None
            }
            Command::Close(id) => match self.registry.get(id) {
                Some(surface) => {
                    surface.close();
                    None
                }
                None => Some(format!("no surface '{id}'")),
            },
            Command::State => {
                let committed = self.store.committed();
                Some(
                    json!({
                        "revision": committed.revision,
                        "state": committed.state.as_ref(),
                        "tray": self.tray.tooltip(),
                    })
                    .to_string(),
                )
            }
            Command::Quit => {
                shutdown.signal();
                None
            }
        }
    }

    /// Read console commands from `input` until `quit` or shutdown.
    ///
    /// End of input does not stop the owner; it keeps serving views until a
    /// signal arrives.
    pub async fn run_console<R>(&self, input: R, shutdown: &ShutdownManager) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while !shutdown.is_shutting_down() {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::debug!("Console input closed");
                        shutdown.wait().await;
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match console::parse(&line) {
                        Ok(command) => {
                            if let Some(output) = self.execute(command, shutdown) {
                                println!("{output}");
                            }
                        }
                        Err(error) => eprintln!("error: {error}"),
                    }
                }
                _ = shutdown.wait() => break,
            }
        }
        Ok(())
    }
}
