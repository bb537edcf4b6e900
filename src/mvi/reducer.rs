//! Reducer trait for MVI architecture.

use super::state::StateTree;

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure, total function: (State, Intent) -> State.
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: StateTree;

    /// The intent type this reducer handles.
    ///
    /// Slice intents never cross the process boundary on their own, so only
    /// the root intent needs [`Intent`](super::Intent) for wire conversion.
    type Intent: Clone + std::fmt::Debug + Send + 'static;

    /// Process an intent and return the new state.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;

    /// Same as [`Reducer::reduce`], substituting the default state when none exists yet.
    fn reduce_or_default(state: Option<Self::State>, intent: Self::Intent) -> Self::State {
        Self::reduce(state.unwrap_or_default(), intent)
    }
}
