//! View half of the bridge.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::mvi::{Intent, StateTree};
use crate::protocol::{BridgeRequest, Origin, Snapshot, WireIntent};

use super::BridgeError;

/// Untyped connection to an owner: a request queue plus the push feed.
///
/// Obtained from [`OwnerBridge::endpoint`](super::OwnerBridge::endpoint) in
/// process, or from [`stream::connect`](super::stream::connect) across a
/// byte stream. Cloning shares the connection.
///
/// The push feed is held weakly: it closes as soon as the owner side drops
/// it, even while views are still attached.
#[derive(Clone)]
pub struct ViewEndpoint {
    requests: mpsc::UnboundedSender<BridgeRequest>,
    pushes: broadcast::WeakSender<Snapshot>,
    request_timeout: Duration,
}

impl ViewEndpoint {
    pub(crate) fn new(
        requests: mpsc::UnboundedSender<BridgeRequest>,
        pushes: broadcast::WeakSender<Snapshot>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            requests,
            pushes,
            request_timeout,
        }
    }

    /// Fire-and-forget dispatch. Nothing is reported back; the effect shows
    /// up in a later push.
    pub fn send(&self, intent: WireIntent) {
        let kind = intent.kind.clone();
        let request = BridgeRequest::Dispatch {
            intent,
            origin: Origin::View,
        };
        if self.requests.send(request).is_err() {
            tracing::trace!(intent_type = %kind, "Dispatch dropped (owner gone)");
        }
    }

    /// Queue a `getState` without waiting for the answer.
    pub(crate) fn enqueue_get_state(&self) -> Result<oneshot::Receiver<Snapshot>, BridgeError> {
        let (respond_to, receiver) = oneshot::channel();
        self.requests
            .send(BridgeRequest::GetState { respond_to })
            .map_err(|_| BridgeError::Disconnected)?;
        Ok(receiver)
    }

    /// Ask the owner for its current state.
    pub async fn request_state(&self) -> Result<Snapshot, BridgeError> {
        let receiver = self.enqueue_get_state()?;
        recv_with_timeout(receiver, self.request_timeout).await
    }

    /// Receiver of every push made from now on. Once the owner side is gone
    /// the receiver reports closed straight away.
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        match self.pushes.upgrade() {
            Some(pushes) => pushes.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.requests.is_closed()
    }

    /// Resolves once the owner side stops taking requests.
    pub async fn closed(&self) {
        self.requests.closed().await
    }
}

async fn recv_with_timeout<T>(
    receiver: oneshot::Receiver<T>,
    timeout: Duration,
) -> Result<T, BridgeError> {
    match tokio::time::timeout(timeout, receiver).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(BridgeError::Disconnected),
        Err(_) => Err(BridgeError::Timeout(timeout)),
    }
}

/// Decoded state with the revision it was committed at.
#[derive(Debug, PartialEq)]
pub struct Versioned<S> {
    pub revision: u64,
    pub state: Arc<S>,
}

impl<S> Clone for Versioned<S> {
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: StateTree> Versioned<S> {
    pub fn decode(snapshot: &Snapshot) -> Result<Self, BridgeError> {
        Ok(Self {
            revision: snapshot.revision,
            state: Arc::new(snapshot.decode()?),
        })
    }
}

/// Typed view-side API: `dispatch`, `get_state`, `subscribe`.
pub struct ViewBridge<S, I> {
    endpoint: ViewEndpoint,
    _types: PhantomData<fn() -> (S, I)>,
}

impl<S, I> Clone for ViewBridge<S, I> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            _types: PhantomData,
        }
    }
}

impl<S: StateTree, I: Intent> ViewBridge<S, I> {
    pub fn new(endpoint: ViewEndpoint) -> Self {
        Self {
            endpoint,
            _types: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &ViewEndpoint {
        &self.endpoint
    }

    pub fn dispatch(&self, intent: &I) {
        self.endpoint.send(intent.to_wire());
    }

    pub fn dispatch_wire(&self, intent: WireIntent) {
        self.endpoint.send(intent);
    }

    pub async fn get_state(&self) -> Result<Versioned<S>, BridgeError> {
        let snapshot = self.endpoint.request_state().await?;
        Versioned::decode(&snapshot)
    }

    /// Call `callback` with every state pushed after this call returns.
    ///
    /// The push receiver is registered before returning, so no commit made
    /// afterwards can be missed. A lagging subscriber skips ahead; since
    /// every push is a full state, only intermediate states are lost.
    pub fn subscribe<F>(&self, callback: F) -> ViewSubscription
    where
        F: Fn(Versioned<S>) + Send + 'static,
    {
        let mut pushes = self.endpoint.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match pushes.recv().await {
                    Ok(snapshot) => match Versioned::decode(&snapshot) {
                        Ok(versioned) => callback(versioned),
                        Err(error) => {
                            tracing::warn!(%error, revision = snapshot.revision, "Undecodable state push")
                        }
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "View lagged behind state pushes");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        ViewSubscription { task }
    }
}

/// Handle returned by [`ViewBridge::subscribe`]. Dropping it stops delivery.
#[must_use = "dropping a ViewSubscription stops delivery"]
pub struct ViewSubscription {
    task: JoinHandle<()>,
}

impl ViewSubscription {
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

impl Drop for ViewSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
