//! Settings slice: which view surfaces should currently exist.

use serde::{Deserialize, Serialize};

use crate::mvi::Reducer;

pub const ADD_VISIBLE: &str = "SETTINGS:ADD_VISIBLE";
pub const REMOVE_VISIBLE: &str = "SETTINGS:REMOVE_VISIBLE";
pub const TOGGLE_VISIBLE: &str = "SETTINGS:TOGGLE_VISIBLE";
pub const DESTROY_WINDOW_INTERNAL: &str = "SETTINGS:DESTROY_WINDOW_INTERNAL";

/// Stable identifier of a view surface slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VisibleId {
    #[serde(rename = "index")]
    Index,
    #[serde(rename = "tray")]
    Tray,
    #[serde(rename = "add-to-do/vanilla")]
    AddToDoVanilla,
    #[serde(rename = "add-to-do/svelte")]
    AddToDoSvelte,
}

impl VisibleId {
    pub const ALL: [VisibleId; 4] = [
        VisibleId::Index,
        VisibleId::Tray,
        VisibleId::AddToDoVanilla,
        VisibleId::AddToDoSvelte,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisibleId::Index => "index",
            VisibleId::Tray => "tray",
            VisibleId::AddToDoVanilla => "add-to-do/vanilla",
            VisibleId::AddToDoSvelte => "add-to-do/svelte",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == raw)
    }
}

impl std::fmt::Display for VisibleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsState {
    pub visible: Vec<VisibleId>,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            visible: vec![VisibleId::Index, VisibleId::Tray],
        }
    }
}

impl SettingsState {
    pub fn is_visible(&self, id: VisibleId) -> bool {
        self.visible.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsIntent {
    AddVisible(VisibleId),
    RemoveVisible(VisibleId),
    ToggleVisible(VisibleId),
    /// Emitted by a surface after it has been torn down. Same effect as
    /// `RemoveVisible`, but never intercepted by the side-effect router.
    DestroyWindowInternal(VisibleId),
}

impl SettingsIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            SettingsIntent::AddVisible(_) => ADD_VISIBLE,
            SettingsIntent::RemoveVisible(_) => REMOVE_VISIBLE,
            SettingsIntent::ToggleVisible(_) => TOGGLE_VISIBLE,
            SettingsIntent::DestroyWindowInternal(_) => DESTROY_WINDOW_INTERNAL,
        }
    }

    pub fn slot(&self) -> VisibleId {
        match self {
            SettingsIntent::AddVisible(id)
            | SettingsIntent::RemoveVisible(id)
            | SettingsIntent::ToggleVisible(id)
            | SettingsIntent::DestroyWindowInternal(id) => *id,
        }
    }
}

pub struct SettingsReducer;

impl Reducer for SettingsReducer {
    type State = SettingsState;
    type Intent = SettingsIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            SettingsIntent::AddVisible(id) => with_visible(state, id),
            SettingsIntent::RemoveVisible(id) | SettingsIntent::DestroyWindowInternal(id) => {
                without_visible(state, id)
            }
            SettingsIntent::ToggleVisible(id) => {
                if state.is_visible(id) {
                    without_visible(state, id)
                } else {
                    with_visible(state, id)
                }
            }
        }
    }
}

fn with_visible(mut state: SettingsState, id: VisibleId) -> SettingsState {
    if !state.visible.contains(&id) {
        state.visible.push(id);
    }
    state
}

fn without_visible(mut state: SettingsState, id: VisibleId) -> SettingsState {
    state.visible.retain(|visible| *visible != id);
    state
}
