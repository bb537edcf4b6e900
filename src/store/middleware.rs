//! Middleware chain.

use std::sync::Arc;

use crate::mvi::Reducer;

use super::Store;

/// A step between `dispatch` and the reducer.
///
/// A middleware may inspect the intent, call `next.run(intent)` to hand it on
/// (at most once), act after it returns, or swallow the intent by not calling
/// `next` at all. It may also dispatch new intents through `store`.
pub trait Middleware<R: Reducer>: Send + Sync + 'static {
    fn handle(&self, store: &Store<R>, intent: R::Intent, next: Next<'_, R>);
}

/// The remainder of the chain after the current middleware.
pub struct Next<'a, R: Reducer> {
    store: &'a Store<R>,
    chain: &'a [Arc<dyn Middleware<R>>],
}

impl<'a, R: Reducer> Next<'a, R> {
    pub(super) fn new(store: &'a Store<R>, chain: &'a [Arc<dyn Middleware<R>>]) -> Self {
        Self { store, chain }
    }

    pub fn run(self, intent: R::Intent) {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(self.store, intent, Next::new(self.store, rest)),
            None => self.store.commit(intent),
        }
    }
}

/// Traces every intent that enters the chain and the revision it produced.
pub struct LoggingMiddleware;

impl<R: Reducer> Middleware<R> for LoggingMiddleware {
    fn handle(&self, store: &Store<R>, intent: R::Intent, next: Next<'_, R>) {
        tracing::debug!(intent = ?intent, "Dispatching intent");
        next.run(intent);
        tracing::debug!(revision = store.revision(), "Intent handled");
    }
}
