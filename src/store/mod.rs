//! Owner-side store: one authoritative state, a middleware chain, listeners.
//!
//! Every dispatch walks the middleware chain in registration order; the end
//! of the chain reduces and commits. A commit bumps the revision and then
//! calls every listener synchronously, in subscription order. Identity
//! reductions are commits too, so a no-op intent still produces a push.

mod middleware;
mod thunk;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::mvi::Reducer;

pub use middleware::{LoggingMiddleware, Middleware, Next};
pub use thunk::Thunk;

/// A committed state together with the revision it was committed at.
#[derive(Debug)]
pub struct Committed<S> {
    pub revision: u64,
    pub state: Arc<S>,
}

impl<S> Clone for Committed<S> {
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            state: Arc::clone(&self.state),
        }
    }
}

type Listener<S> = Arc<dyn Fn(&Committed<S>) + Send + Sync>;

struct StoreInner<R: Reducer> {
    committed: RwLock<Committed<R::State>>,
    listeners: Mutex<Vec<(u64, Listener<R::State>)>>,
    next_listener_id: AtomicU64,
    middleware: Vec<Arc<dyn Middleware<R>>>,
}

/// Cheap, cloneable handle to the store.
pub struct Store<R: Reducer> {
    inner: Arc<StoreInner<R>>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Reducer> Store<R> {
    pub fn builder() -> StoreBuilder<R> {
        StoreBuilder::new()
    }

    /// Current state. Owner process only.
    pub fn get_state(&self) -> Arc<R::State> {
        Arc::clone(&self.inner.committed.read().state)
    }

    /// Number of commits since the store was built.
    pub fn revision(&self) -> u64 {
        self.inner.committed.read().revision
    }

    /// State and revision read atomically.
    pub fn committed(&self) -> Committed<R::State> {
        self.inner.committed.read().clone()
    }

    /// Run an intent through the middleware chain.
    pub fn dispatch(&self, intent: R::Intent) {
        Next::new(self, &self.inner.middleware).run(intent);
    }

    /// Register a listener called after every commit.
    ///
    /// The returned handle removes exactly this listener when dropped or
    /// when [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Committed<R::State>) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));

        let weak: Weak<StoreInner<R>> = Arc::downgrade(&self.inner);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.listeners.lock().retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Reduce and publish. Reached only from the end of the middleware chain.
    fn commit(&self, intent: R::Intent) {
        let committed = {
            let mut guard = self.inner.committed.write();
            let next = R::reduce(R::State::clone(&guard.state), intent);
            let state = if next == *guard.state {
                Arc::clone(&guard.state)
            } else {
                Arc::new(next)
            };
            *guard = Committed {
                revision: guard.revision + 1,
                state,
            };
            guard.clone()
        };

        let listeners: Vec<Listener<R::State>> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&committed);
        }
    }
}

/// Handle returned by [`Store::subscribe`].
#[must_use = "dropping a Subscription removes the listener"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

pub struct StoreBuilder<R: Reducer> {
    initial: Option<R::State>,
    middleware: Vec<Arc<dyn Middleware<R>>>,
}

impl<R: Reducer> StoreBuilder<R> {
    pub fn new() -> Self {
        Self {
            initial: None,
            middleware: Vec::new(),
        }
    }

    /// Initial state. Defaults to `R::State::default()`.
    pub fn initial_state(mut self, state: R::State) -> Self {
        self.initial = Some(state);
        self
    }

    /// Append a middleware. The first one added sees intents first.
    pub fn middleware<M: Middleware<R>>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> Store<R> {
        Store {
            inner: Arc::new(StoreInner {
                committed: RwLock::new(Committed {
                    revision: 0,
                    state: Arc::new(self.initial.unwrap_or_default()),
                }),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                middleware: self.middleware,
            }),
        }
    }
}

impl<R: Reducer> Default for StoreBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
