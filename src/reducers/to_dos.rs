//! To-do list slice.

use serde::{Deserialize, Serialize};

use crate::mvi::Reducer;

pub const ADD: &str = "TO_DO:ADD";
pub const TOGGLE: &str = "TO_DO:TOGGLE";
pub const REMOVE: &str = "TO_DO:REMOVE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToDoState {
    pub items: Vec<ToDo>,
}

impl ToDoState {
    pub fn completed(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToDoIntent {
    /// The id travels with the intent so that replaying it is deterministic.
    Add { id: String, title: String },
    Toggle { id: String },
    Remove { id: String },
}

impl ToDoIntent {
    /// Build an `Add` intent with a freshly generated id.
    pub fn add(title: impl Into<String>) -> Self {
        ToDoIntent::Add {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
        }
    }
}

pub struct ToDoReducer;

impl Reducer for ToDoReducer {
    type State = ToDoState;
    type Intent = ToDoIntent;

    fn reduce(mut state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ToDoIntent::Add { id, title } => {
                if !state.items.iter().any(|item| item.id == id) {
                    state.items.push(ToDo {
                        id,
                        title,
                        completed: false,
                    });
                }
                state
            }
            ToDoIntent::Toggle { id } => {
                if let Some(item) = state.items.iter_mut().find(|item| item.id == id) {
                    item.completed = !item.completed;
                }
                state
            }
            ToDoIntent::Remove { id } => {
                state.items.retain(|item| item.id != id);
                state
            }
        }
    }
}
