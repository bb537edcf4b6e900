//! Deferred intents.

use std::future::Future;
use std::pin::Pin;

use crate::mvi::Reducer;

use super::Store;

type ThunkFuture<I> = Pin<Box<dyn Future<Output = Option<I>> + Send>>;

/// Async work that may resolve to an intent.
///
/// The thunk receives a store handle (so it can read state or dispatch on its
/// own). Whatever intent it resolves to is dispatched through the full
/// middleware chain only after the future completes.
pub struct Thunk<R: Reducer> {
    run: Box<dyn FnOnce(Store<R>) -> ThunkFuture<R::Intent> + Send>,
}

impl<R: Reducer> Thunk<R> {
    pub fn new<F, Fut>(thunk: F) -> Self
    where
        F: FnOnce(Store<R>) -> Fut + Send + 'static,
        Fut: Future<Output = Option<R::Intent>> + Send + 'static,
    {
        Self {
            run: Box::new(move |store| Box::pin(thunk(store))),
        }
    }
}

impl<R: Reducer> Store<R> {
    pub async fn dispatch_thunk(&self, thunk: Thunk<R>) {
        let resolved = (thunk.run)(self.clone()).await;
        if let Some(intent) = resolved {
            self.dispatch(intent);
        }
    }
}
