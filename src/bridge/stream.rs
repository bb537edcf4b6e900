//! Bridge over a byte stream: newline-delimited JSON frames.
//!
//! ```text
//! view  -> owner  {"kind":"getState","id":7}
//! view  -> owner  {"kind":"dispatch","intent":{"type":"INCREMENT"}}
//! owner -> view   {"kind":"state","id":7,"revision":3,"state":{...}}
//! owner -> view   {"kind":"subscribe","revision":4,"state":{...}}
//! ```
//!
//! The owner side turns a connection into calls on a [`ViewEndpoint`]; the
//! view side turns a connection back into a [`ViewEndpoint`], so a
//! [`ViewBridge`](super::ViewBridge) cannot tell the two apart.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::protocol::{BridgeRequest, Snapshot, WireIntent};
use crate::shutdown::ShutdownManager;

use super::{BridgeError, BridgeSettings, ViewEndpoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Frame {
    GetState {
        id: u64,
    },
    Dispatch {
        intent: WireIntent,
    },
    State {
        id: u64,
        revision: u64,
        state: Arc<Value>,
    },
    Subscribe {
        revision: u64,
        state: Arc<Value>,
    },
}

async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(frame)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Serve one view connection on the owner side.
///
/// Returns when the view hangs up or the owner stops taking requests.
/// Malformed lines are logged and skipped.
pub async fn serve_connection<IO>(io: IO, endpoint: ViewEndpoint) -> Result<(), BridgeError>
where
    IO: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, mut write_half) = tokio::io::split(io);
    let mut lines = BufReader::new(read_half).lines();
    let mut pushes = endpoint.subscribe();
    let (replies, mut outgoing) = mpsc::unbounded_channel::<Frame>();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Frame>(&line) {
                    Ok(Frame::GetState { id }) => {
                        let receiver = endpoint.enqueue_get_state()?;
                        let replies = replies.clone();
                        tokio::spawn(async move {
                            if let Ok(snapshot) = receiver.await {
                                let _ = replies.send(Frame::State {
                                    id,
                                    revision: snapshot.revision,
                                    state: snapshot.state,
                                });
                            }
                        });
                    }
                    Ok(Frame::Dispatch { intent }) => endpoint.send(intent),
                    Ok(frame) => tracing::warn!(?frame, "Unexpected frame from view"),
                    Err(error) => tracing::warn!(%error, "Malformed frame from view"),
                }
            }
            Some(frame) = outgoing.recv() => write_frame(&mut write_half, &frame).await?,
            push = pushes.recv() => match push {
                Ok(snapshot) => {
                    let frame = Frame::Subscribe {
                        revision: snapshot.revision,
                        state: snapshot.state,
                    };
                    write_frame(&mut write_half, &frame).await?;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Stream view lagged behind state pushes");
                }
                Err(RecvError::Closed) => break,
            },
            _ = endpoint.closed() => break,
        }
    }
    Ok(())
}

/// Accept view connections until shutdown.
pub async fn serve_tcp(listener: TcpListener, endpoint: ViewEndpoint, shutdown: Arc<ShutdownManager>) {
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    tracing::info!(%peer, "View connected");
                    let endpoint = endpoint.clone();
                    tokio::spawn(async move {
                        match serve_connection(socket, endpoint).await {
                            Ok(()) => tracing::info!(%peer, "View disconnected"),
                            Err(error) => tracing::warn!(%peer, %error, "View connection failed"),
                        }
                    });
                }
                Err(error) => tracing::warn!(%error, "Failed to accept view connection"),
            },
            _ = shutdown.wait() => break,
        }
    }
    tracing::info!("Stopped accepting views");
}

/// Build a view endpoint on top of a connection to an owner.
///
/// Spawns one task that owns the connection and the push feed. When the
/// owner hangs up the task ends, pending `getState` calls fail with
/// [`BridgeError::Disconnected`], subscribers see the feed close and the
/// endpoint reports closed.
pub fn connect<IO>(io: IO, settings: &BridgeSettings) -> ViewEndpoint
where
    IO: AsyncRead + AsyncWrite + Send + 'static,
{
    let (requests, mut inbound) = mpsc::unbounded_channel::<BridgeRequest>();
    let (pushes, _) = broadcast::channel(settings.push_capacity.max(1));
    let endpoint = ViewEndpoint::new(requests, pushes.downgrade(), settings.request_timeout);

    tokio::spawn(async move {
        let (read_half, mut write_half) = tokio::io::split(io);
        let mut lines = BufReader::new(read_half).lines();
        let mut pending: HashMap<u64, oneshot::Sender<Snapshot>> = HashMap::new();
        let mut next_id = 0u64;

        loop {
            tokio::select! {
                request = inbound.recv() => {
                    let Some(request) = request else { break };
                    let frame = match request {
                        BridgeRequest::GetState { respond_to } => {
                            next_id += 1;
                            pending.insert(next_id, respond_to);
                            Frame::GetState { id: next_id }
                        }
                        BridgeRequest::Dispatch { intent, .. } => Frame::Dispatch { intent },
                    };
                    if let Err(error) = write_frame(&mut write_half, &frame).await {
                        tracing::debug!(%error, "Owner connection write failed");
                        break;
                    }
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match serde_json::from_str::<Frame>(&line) {
                        Ok(Frame::State { id, revision, state }) => match pending.remove(&id) {
                            Some(respond_to) => {
                                let _ = respond_to.send(Snapshot { revision, state });
                            }
                            None => tracing::debug!(id, "Response for unknown request"),
                        },
                        Ok(Frame::Subscribe { revision, state }) => {
                            let _ = pushes.send(Snapshot { revision, state });
                        }
                        Ok(frame) => tracing::warn!(?frame, "Unexpected frame from owner"),
                        Err(error) => tracing::warn!(%error, "Malformed frame from owner"),
                    },
                    Ok(None) => break,
                    Err(error) => {
                        tracing::debug!(%error, "Owner connection read failed");
                        break;
                    }
                },
            }
        }
        tracing::info!(pending = pending.len(), "Owner connection closed");
    });

    endpoint
}
