use std::time::Duration;

use thiserror::Error;

/// Delivery failures between a view and the owner.
///
/// Only request/response calls surface these; fire-and-forget sends and
/// pushes swallow them because the next full-state push repairs any loss.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bridge channel disconnected")]
    Disconnected,

    #[error("bridge request timed out after {0:?}")]
    Timeout(Duration),

    #[error("state payload could not be encoded or decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
