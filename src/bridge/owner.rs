//! Owner half of the bridge.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use crate::config::{BridgeConfig, DispatchPolicyKind};
use crate::mvi::{Intent, Reducer};
use crate::protocol::{BridgeRequest, Origin, Snapshot, WireIntent};
use crate::store::{Store, Subscription};

use super::view::ViewEndpoint;

/// Which view-originated intents the owner accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Any view may dispatch any intent.
    AllowAll,
    /// Only the listed intent types. The empty sentinel type is always
    /// accepted since it reduces to identity.
    AllowList(HashSet<String>),
}

impl DispatchPolicy {
    pub fn permits(&self, kind: &str) -> bool {
        match self {
            DispatchPolicy::AllowAll => true,
            DispatchPolicy::AllowList(allowed) => kind.is_empty() || allowed.contains(kind),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Pushes buffered per view before a slow view starts lagging.
    pub push_capacity: usize,
    /// How long a view waits for a `getState` answer.
    pub request_timeout: Duration,
    pub policy: DispatchPolicy,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            push_capacity: 64,
            request_timeout: Duration::from_secs(1),
            policy: DispatchPolicy::AllowAll,
        }
    }
}

impl From<&BridgeConfig> for BridgeSettings {
    fn from(config: &BridgeConfig) -> Self {
        let policy = match config.dispatch_policy {
            DispatchPolicyKind::AllowAll => DispatchPolicy::AllowAll,
            DispatchPolicyKind::AllowList => {
                DispatchPolicy::AllowList(config.allowed_intents.iter().cloned().collect())
            }
        };
        Self {
            push_capacity: config.push_capacity,
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            policy,
        }
    }
}

/// Fire-and-forget handle into the owner's inbound queue.
#[derive(Clone)]
pub struct Dispatcher {
    sender: mpsc::UnboundedSender<BridgeRequest>,
    origin: Origin,
}

impl Dispatcher {
    pub(crate) fn new(sender: mpsc::UnboundedSender<BridgeRequest>, origin: Origin) -> Self {
        Self { sender, origin }
    }

    /// Enqueue an intent. Delivery failures are traced and dropped.
    pub fn dispatch(&self, intent: WireIntent) {
        let kind = intent.kind.clone();
        let request = BridgeRequest::Dispatch {
            intent,
            origin: self.origin,
        };
        if self.sender.send(request).is_err() {
            tracing::trace!(intent_type = %kind, "Dispatch dropped (owner gone)");
        }
    }

    pub fn dispatch_intent<I: Intent>(&self, intent: &I) {
        self.dispatch(intent.to_wire());
    }
}

/// Exposes a [`Store`] to view processes.
///
/// Every inbound request is handled by [`OwnerBridge::run`] in arrival order,
/// so reductions triggered from views never interleave. Every commit is
/// serialized once and broadcast to all views.
pub struct OwnerBridge<R: Reducer> {
    store: Store<R>,
    policy: DispatchPolicy,
    request_timeout: Duration,
    sender: mpsc::UnboundedSender<BridgeRequest>,
    requests: mpsc::UnboundedReceiver<BridgeRequest>,
    pushes: broadcast::Sender<Snapshot>,
    _subscription: Subscription,
}

impl<R> OwnerBridge<R>
where
    R: Reducer,
    R::Intent: Intent,
{
    pub fn attach(store: Store<R>, settings: BridgeSettings) -> Self {
        let (sender, requests) = mpsc::unbounded_channel();
        let (pushes, _) = broadcast::channel(settings.push_capacity.max(1));

        let push_sender = pushes.clone();
        let subscription = store.subscribe(move |committed| {
            let state = match serde_json::to_value(committed.state.as_ref()) {
                Ok(state) => state,
                Err(error) => {
                    tracing::warn!(%error, revision = committed.revision, "Failed to encode state push");
                    return;
                }
            };
            match push_sender.send(Snapshot::new(committed.revision, state)) {
                Ok(views) => {
                    tracing::debug!(revision = committed.revision, views, "Pushed state")
                }
                Err(_) => tracing::trace!(revision = committed.revision, "No views attached"),
            }
        });

        if settings.policy == DispatchPolicy::AllowAll {
            tracing::info!("Owner bridge accepts any intent from any view");
        }

        Self {
            store,
            policy: settings.policy,
            request_timeout: settings.request_timeout,
            sender,
            requests,
            pushes,
            _subscription: subscription,
        }
    }

    /// Endpoint handed to a view. Its dispatches are subject to the policy.
    pub fn endpoint(&self) -> ViewEndpoint {
        ViewEndpoint::new(
            self.sender.clone(),
            self.pushes.downgrade(),
            self.request_timeout,
        )
    }

    /// Dispatcher for the owner's own collaborators (surfaces, console).
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.sender.clone(), Origin::Owner)
    }

    /// Serve requests until every endpoint and dispatcher is dropped.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Serve requests until `shutdown` completes or every endpoint and
    /// dispatcher is dropped.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Self {
            store,
            policy,
            sender,
            mut requests,
            ..
        } = self;
        drop(sender);

        tokio::pin!(shutdown);
        loop {
            // Requests queued before shutdown are still served.
            tokio::select! {
                biased;
                request = requests.recv() => match request {
                    Some(request) => handle(&store, &policy, request),
                    None => break,
                },
                _ = &mut shutdown => break,
            }
        }
        tracing::info!(revision = store.revision(), "Owner bridge stopped");
    }
}

fn handle<R>(store: &Store<R>, policy: &DispatchPolicy, request: BridgeRequest)
where
    R: Reducer,
    R::Intent: Intent,
{
    match request {
        BridgeRequest::GetState { respond_to } => {
            let committed = store.committed();
            match serde_json::to_value(committed.state.as_ref()) {
                Ok(state) => {
                    if respond_to
                        .send(Snapshot::new(committed.revision, state))
                        .is_err()
                    {
                        tracing::trace!("getState response dropped (view gone)");
                    }
                }
                Err(error) => tracing::warn!(%error, "Failed to encode state snapshot"),
            }
        }
        BridgeRequest::Dispatch { intent, origin } => {
            if origin == Origin::View && !policy.permits(&intent.kind) {
                tracing::warn!(intent_type = %intent.kind, "Rejected intent from view");
                return;
            }
            store.dispatch(R::Intent::from_wire(&intent));
        }
    }
}
