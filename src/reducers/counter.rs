//! Counter slice.

use crate::mvi::Reducer;

pub const INCREMENT: &str = "INCREMENT";
pub const DECREMENT: &str = "DECREMENT";
pub const INCREASE_BY: &str = "INCREASE_BY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterIntent {
    Increment,
    Decrement,
    /// A missing amount counts as zero.
    IncreaseBy { amount: Option<i64> },
}

pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = i64;
    type Intent = CounterIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            CounterIntent::Increment => state.saturating_add(1),
            CounterIntent::Decrement => state.saturating_sub(1),
            CounterIntent::IncreaseBy { amount } => state.saturating_add(amount.unwrap_or(0)),
        }
    }
}
