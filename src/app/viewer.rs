//! View process: connect to an owner and print mirrored states.

use std::io::Write;

use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::bridge::{stream, BridgeError, BridgeSettings, ViewBridge};
use crate::protocol::WireIntent;
use crate::reducers::{Action, AppState};
use crate::shutdown::ShutdownManager;
use crate::view_store::{BootstrapMode, ViewStore};

#[derive(Debug, Clone, Default)]
pub struct ViewerOptions {
    pub settings: BridgeSettings,
    pub bootstrap: BootstrapMode,
    /// Sent right after bootstrap, in order.
    pub dispatch: Vec<WireIntent>,
    /// Print the state once every dispatch has been applied, then exit.
    pub once: bool,
}

/// Drive one view over `io`, writing `{"revision":..,"state":..}` lines to
/// `out`.
///
/// Runs until the owner hangs up or shutdown is signalled, unless
/// `options.once` is set.
pub async fn run_viewer<IO, W>(
    io: IO,
    options: ViewerOptions,
    mut out: W,
    shutdown: &ShutdownManager,
) -> Result<(), BridgeError>
where
    IO: AsyncRead + AsyncWrite + Send + 'static,
    W: Write,
{
    let endpoint = stream::connect(io, &options.settings);
    let bridge = ViewBridge::<AppState, Action>::new(endpoint.clone());
    let mut view = ViewStore::attach(bridge.clone(), options.bootstrap).await?;

    for intent in options.dispatch {
        tracing::debug!(intent_type = %intent.kind, "Dispatching from view");
        bridge.dispatch_wire(intent);
    }

    if options.once {
        // Requests share one ordered connection, so this answer already
        // reflects every dispatch above.
        let latest = bridge.get_state().await?;
        return print_state(&mut out, Some(latest.revision), &latest.state);
    }

    if view.is_ready() {
        print_state(&mut out, view.revision(), &view.state())?;
    }
    loop {
        tokio::select! {
            changed = view.changed() => {
                let state = changed?;
                print_state(&mut out, view.revision(), &state)?;
            }
            _ = endpoint.closed() => {
                tracing::info!("Owner went away");
                break;
            }
            _ = shutdown.wait() => break,
        }
    }
    Ok(())
}

fn print_state<W: Write>(out: &mut W, revision: Option<u64>, state: &AppState) -> Result<(), BridgeError> {
    let line = json!({ "revision": revision, "state": state });
    serde_json::to_writer(&mut *out, &line)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
