use serde::{Deserialize, Serialize};

use crate::reducers::VisibleId;
use crate::view_store::BootstrapMode;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub startup: StartupConfig,
}

/// Owner bridge settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Pushes buffered per view before it lags (default: 64).
    #[serde(default = "default_push_capacity")]
    pub push_capacity: usize,
    /// getState timeout in milliseconds (default: 1000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Which view intents are accepted (default: allow_all).
    #[serde(default)]
    pub dispatch_policy: DispatchPolicyKind,
    /// Intent types accepted under `allow_list`.
    #[serde(default)]
    pub allowed_intents: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicyKind {
    #[default]
    AllowAll,
    AllowList,
}

/// View process settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub bootstrap: BootstrapMode,
}

/// Initial state of the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Surfaces visible at start (default: index, tray).
    #[serde(default = "default_visible")]
    pub visible: Vec<VisibleId>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            push_capacity: default_push_capacity(),
            request_timeout_ms: default_request_timeout_ms(),
            dispatch_policy: DispatchPolicyKind::default(),
            allowed_intents: Vec::new(),
        }
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            visible: default_visible(),
        }
    }
}

fn default_push_capacity() -> usize {
    64
}

fn default_request_timeout_ms() -> u64 {
    1000
}

fn default_visible() -> Vec<VisibleId> {
    vec![VisibleId::Index, VisibleId::Tray]
}
