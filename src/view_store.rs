//! View-side store: a read-only mirror of the owner's state.
//!
//! The mirror is written only by the bootstrap and by pushes, and only
//! moves forward in revision. UI code reads it and sends intents back; it
//! never reduces anything locally.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::bridge::{BridgeError, Versioned, ViewBridge, ViewSubscription};
use crate::mvi::{Intent, StateTree};
use crate::protocol::WireIntent;

/// How a freshly attached view obtains its first state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapMode {
    /// Ask the owner with an explicit `getState`.
    #[default]
    GetState,
    /// Dispatch an empty-type intent; the resulting identity commit pushes
    /// the current state to every view.
    SentinelDispatch,
}

type Slot<S> = Option<Versioned<S>>;

/// Read-only handle on a mirrored state.
pub struct Mirror<S> {
    receiver: watch::Receiver<Slot<S>>,
    fallback: Arc<S>,
}

impl<S> Clone for Mirror<S> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            fallback: Arc::clone(&self.fallback),
        }
    }
}

impl<S: StateTree> Mirror<S> {
    /// Latest mirrored state, or the default state before the first snapshot.
    pub fn get(&self) -> Arc<S> {
        match self.receiver.borrow().as_ref() {
            Some(versioned) => Arc::clone(&versioned.state),
            None => Arc::clone(&self.fallback),
        }
    }

    pub fn revision(&self) -> Option<u64> {
        self.receiver.borrow().as_ref().map(|versioned| versioned.revision)
    }

    /// Whether any snapshot has arrived yet.
    pub fn is_ready(&self) -> bool {
        self.receiver.borrow().is_some()
    }

    /// Wait for the next accepted snapshot.
    pub async fn changed(&mut self) -> Result<Arc<S>, BridgeError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| BridgeError::Disconnected)?;
        Ok(self.get())
    }

    /// Wait until the mirrored state satisfies `predicate`.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Result<Arc<S>, BridgeError>
    where
        F: Fn(&S) -> bool,
    {
        loop {
            let current = self.receiver.borrow_and_update().as_ref().map(|v| Arc::clone(&v.state));
            if let Some(state) = current {
                if predicate(&state) {
                    return Ok(state);
                }
            }
            self.receiver
                .changed()
                .await
                .map_err(|_| BridgeError::Disconnected)?;
        }
    }
}

/// Accept `incoming` unless the mirror already holds the same or a newer
/// revision.
fn advance<S>(sender: &watch::Sender<Slot<S>>, incoming: Versioned<S>) -> bool {
    sender.send_if_modified(|held| {
        if let Some(current) = held {
            if current.revision >= incoming.revision {
                tracing::trace!(
                    held = current.revision,
                    incoming = incoming.revision,
                    "Ignored stale snapshot"
                );
                return false;
            }
        }
        *held = Some(incoming);
        true
    })
}

/// Observable state container for one view.
pub struct ViewStore<S, I> {
    bridge: ViewBridge<S, I>,
    mirror: Mirror<S>,
    _subscription: ViewSubscription,
}

impl<S: StateTree, I: Intent> ViewStore<S, I> {
    /// Subscribe to pushes, then bootstrap.
    ///
    /// With [`BootstrapMode::GetState`] the mirror is ready when this
    /// returns. With [`BootstrapMode::SentinelDispatch`] it becomes ready on
    /// the first push.
    pub async fn attach(bridge: ViewBridge<S, I>, mode: BootstrapMode) -> Result<Self, BridgeError> {
        let (sender, mut receiver) = watch::channel(None);
        let sender = Arc::new(sender);

        let push_sender = Arc::clone(&sender);
        let subscription = bridge.subscribe(move |versioned| {
            let revision = versioned.revision;
            if advance(&push_sender, versioned) {
                tracing::debug!(revision, "Mirror updated from push");
            }
        });

        match mode {
            BootstrapMode::GetState => {
                let versioned = bridge.get_state().await?;
                tracing::debug!(revision = versioned.revision, "Mirror bootstrapped");
                advance(&sender, versioned);
                // The bootstrap is the starting point, not a change.
                receiver.borrow_and_update();
            }
            BootstrapMode::SentinelDispatch => bridge.dispatch_wire(WireIntent::sentinel()),
        }

        Ok(Self {
            bridge,
            mirror: Mirror {
                receiver,
                fallback: Arc::new(S::default()),
            },
            _subscription: subscription,
        })
    }

    pub fn state(&self) -> Arc<S> {
        self.mirror.get()
    }

    pub fn revision(&self) -> Option<u64> {
        self.mirror.revision()
    }

    pub fn is_ready(&self) -> bool {
        self.mirror.is_ready()
    }

    /// Read-only handle that can be handed to UI code.
    pub fn mirror(&self) -> Mirror<S> {
        self.mirror.clone()
    }

    pub async fn changed(&mut self) -> Result<Arc<S>, BridgeError> {
        self.mirror.changed().await
    }

    pub fn dispatch(&self, intent: &I) {
        self.bridge.dispatch(intent);
    }
}
