//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use statebridge::bridge::{BridgeSettings, OwnerBridge, ViewEndpoint};
use statebridge::reducers::{Action, AppReducer, AppState};
use statebridge::store::Store;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(2);

/// Await `future`, failing the test if it takes longer than [`WAIT`].
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(WAIT, future)
        .await
        .expect("timed out waiting")
}

pub fn app_store() -> Store<AppReducer> {
    Store::builder().build()
}

/// A running owner: the store, one view endpoint, and the bridge task.
pub struct RunningOwner {
    pub store: Store<AppReducer>,
    pub endpoint: ViewEndpoint,
    pub task: JoinHandle<()>,
}

/// Attach a bridge to `store` and spawn its loop.
pub fn spawn_owner(store: Store<AppReducer>, settings: BridgeSettings) -> RunningOwner {
    let bridge = OwnerBridge::attach(store.clone(), settings);
    let endpoint = bridge.endpoint();
    let task = tokio::spawn(bridge.run());
    RunningOwner {
        store,
        endpoint,
        task,
    }
}

/// Collects values handed to a callback.
#[derive(Clone)]
pub struct Recorder<T> {
    seen: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, value: T) {
        self.seen.lock().push(value);
    }

    pub fn take(&self) -> Vec<T> {
        self.seen.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Poll until at least `count` values were recorded.
    pub async fn wait_for(&self, count: usize) -> Vec<T> {
        within(async {
            loop {
                if self.len() >= count {
                    return self.take();
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
    }
}

/// Write `content` to a config.toml inside a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
