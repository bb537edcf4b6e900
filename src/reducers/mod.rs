//! Application state tree and its reducers.
//!
//! Each slice reducer only ever sees its own sub-state; [`AppReducer`] routes
//! every [`Action`] to the slice it belongs to and leaves the others alone.

pub mod counter;
pub mod settings;
pub mod to_dos;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::mvi::{Intent, Reducer, StateTree};
use crate::protocol::WireIntent;

pub use counter::{CounterIntent, CounterReducer};
pub use settings::{SettingsIntent, SettingsReducer, SettingsState, VisibleId};
pub use to_dos::{ToDo, ToDoIntent, ToDoReducer, ToDoState};

impl StateTree for i64 {}
impl StateTree for SettingsState {}
impl StateTree for ToDoState {}
impl StateTree for AppState {}

/// Root of the replicated state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppState {
    pub counter: i64,
    pub settings: SettingsState,
    pub to_dos: ToDoState,
}

/// Every intent the owner understands, plus a catch-all.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Counter(CounterIntent),
    Settings(SettingsIntent),
    ToDo(ToDoIntent),
    /// Anything else, kept verbatim. Reduces to identity.
    Unknown(WireIntent),
}

impl Action {
    /// Slot targeted by an intent the side-effect router reacts to.
    ///
    /// Only add/remove/toggle qualify; the internal destroy notification does
    /// not, otherwise a surface closing itself would be torn down twice.
    pub fn visibility_slot(&self) -> Option<VisibleId> {
        match self {
            Action::Settings(
                SettingsIntent::AddVisible(id)
                | SettingsIntent::RemoveVisible(id)
                | SettingsIntent::ToggleVisible(id),
            ) => Some(*id),
            _ => None,
        }
    }

    /// Notification that the surface in `slot` went away on its own.
    pub fn surface_destroyed(slot: VisibleId) -> Self {
        Action::Settings(SettingsIntent::DestroyWindowInternal(slot))
    }

    /// Slot named by a destroy notification.
    pub fn destroyed_slot(&self) -> Option<VisibleId> {
        match self {
            Action::Settings(SettingsIntent::DestroyWindowInternal(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Action::Counter(CounterIntent::Increment) => counter::INCREMENT,
            Action::Counter(CounterIntent::Decrement) => counter::DECREMENT,
            Action::Counter(CounterIntent::IncreaseBy { .. }) => counter::INCREASE_BY,
            Action::Settings(intent) => intent.kind(),
            Action::ToDo(ToDoIntent::Add { .. }) => to_dos::ADD,
            Action::ToDo(ToDoIntent::Toggle { .. }) => to_dos::TOGGLE,
            Action::ToDo(ToDoIntent::Remove { .. }) => to_dos::REMOVE,
            Action::Unknown(wire) => &wire.kind,
        }
    }
}

impl Intent for Action {
    fn from_wire(wire: &WireIntent) -> Self {
        let decoded = match wire.kind.as_str() {
            counter::INCREMENT => Some(Action::Counter(CounterIntent::Increment)),
            counter::DECREMENT => Some(Action::Counter(CounterIntent::Decrement)),
            counter::INCREASE_BY => Some(Action::Counter(CounterIntent::IncreaseBy {
                amount: wire.payload_i64(),
            })),
            settings::ADD_VISIBLE => slot(wire).map(SettingsIntent::AddVisible).map(Action::Settings),
            settings::REMOVE_VISIBLE => slot(wire)
                .map(SettingsIntent::RemoveVisible)
                .map(Action::Settings),
            settings::TOGGLE_VISIBLE => slot(wire)
                .map(SettingsIntent::ToggleVisible)
                .map(Action::Settings),
            settings::DESTROY_WINDOW_INTERNAL => slot(wire)
                .map(SettingsIntent::DestroyWindowInternal)
                .map(Action::Settings),
            to_dos::ADD => to_do_add(wire).map(Action::ToDo),
            to_dos::TOGGLE => wire
                .payload_str()
                .map(|id| Action::ToDo(ToDoIntent::Toggle { id: id.to_string() })),
            to_dos::REMOVE => wire
                .payload_str()
                .map(|id| Action::ToDo(ToDoIntent::Remove { id: id.to_string() })),
            _ => None,
        };
        decoded.unwrap_or_else(|| Action::Unknown(wire.clone()))
    }

    fn to_wire(&self) -> WireIntent {
        match self {
            Action::Counter(CounterIntent::IncreaseBy {
                amount: Some(amount),
            }) => WireIntent::with_payload(counter::INCREASE_BY, json!(amount)),
            Action::Counter(_) => WireIntent::new(self.kind()),
            Action::Settings(intent) => WireIntent::with_payload(
                intent.kind(),
                Value::String(intent.slot().as_str().to_string()),
            ),
            Action::ToDo(ToDoIntent::Add { id, title }) => {
                WireIntent::with_payload(to_dos::ADD, json!({ "id": id, "title": title }))
            }
            Action::ToDo(ToDoIntent::Toggle { id }) | Action::ToDo(ToDoIntent::Remove { id }) => {
                WireIntent::with_payload(self.kind(), Value::String(id.clone()))
            }
            Action::Unknown(wire) => wire.clone(),
        }
    }
}

fn slot(wire: &WireIntent) -> Option<VisibleId> {
    wire.payload_str().and_then(VisibleId::parse)
}

/// `TO_DO:ADD` takes `{ "id", "title" }`, or a bare title string for which an
/// id is generated at decode time.
fn to_do_add(wire: &WireIntent) -> Option<ToDoIntent> {
    match wire.payload.as_ref()? {
        Value::String(title) => Some(ToDoIntent::add(title.clone())),
        Value::Object(fields) => {
            let title = fields.get("title")?.as_str()?.to_string();
            match fields.get("id").and_then(Value::as_str) {
                Some(id) => Some(ToDoIntent::Add {
                    id: id.to_string(),
                    title,
                }),
                None => Some(ToDoIntent::add(title)),
            }
        }
        _ => None,
    }
}

/// Root reducer composing the slices.
pub struct AppReducer;

impl Reducer for AppReducer {
    type State = AppState;
    type Intent = Action;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            Action::Counter(intent) => AppState {
                counter: CounterReducer::reduce(state.counter, intent),
                ..state
            },
            Action::Settings(intent) => AppState {
                settings: SettingsReducer::reduce(state.settings, intent),
                ..state
            },
            Action::ToDo(intent) => AppState {
                to_dos: ToDoReducer::reduce(state.to_dos, intent),
                ..state
            },
            Action::Unknown(_) => state,
        }
    }
}
