//! Messages exchanged between the owner process and view processes.
//!
//! Nothing here is shared memory: intents and states cross the boundary as
//! JSON values, and every push carries the whole state tree.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

/// Intent as it travels between processes: `{ "type": ..., "payload": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireIntent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl WireIntent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    pub fn with_payload(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload: Some(payload),
        }
    }

    /// Intent with an empty type. Every reducer treats it as identity, so
    /// dispatching it only provokes a push of the current state.
    pub fn sentinel() -> Self {
        Self::new("")
    }

    pub fn payload_str(&self) -> Option<&str> {
        self.payload.as_ref().and_then(Value::as_str)
    }

    pub fn payload_i64(&self) -> Option<i64> {
        self.payload.as_ref().and_then(Value::as_i64)
    }
}

/// Full state tree stamped with the owner's commit counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub revision: u64,
    pub state: Arc<Value>,
}

impl Snapshot {
    pub fn new(revision: u64, state: Value) -> Self {
        Self {
            revision,
            state: Arc::new(state),
        }
    }

    /// Decode into a typed state. Slices missing from the JSON take their
    /// defaults, so a partial tree still decodes.
    pub fn decode<S: DeserializeOwned>(&self) -> Result<S, serde_json::Error> {
        S::deserialize(self.state.as_ref())
    }
}

/// Who put a dispatch on the owner queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A view process. Subject to the owner's dispatch policy.
    View,
    /// The owner itself, e.g. a surface reporting its own destruction.
    Owner,
}

/// Requests the owner bridge loop consumes, in arrival order.
#[derive(Debug)]
pub enum BridgeRequest {
    GetState {
        respond_to: oneshot::Sender<Snapshot>,
    },
    Dispatch {
        intent: WireIntent,
        origin: Origin,
    },
}
