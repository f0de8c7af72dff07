//! The WebSocket RPC server.
//!
//! One listener on localhost; every accepted connection becomes a
//! session with its own reader loop and writer task. Inbound frames
//! are decoded and routed to handlers; intercepted internal traffic is
//! broadcast to all sessions by the window taps. Malformed frames are
//! dropped without closing the connection, and writes to closed peers
//! are swallowed.

use crate::audio;
use crate::error::rpc::RpcError;
use crate::rpc::sessions::{SessionId, SessionRegistry};
use crate::window::WindowManager;
use crate::wire::codec;
use crate::wire::message::{ResponseStatus, WireMessage};
use crate::wire::value::WireValue;
use crate::BRIDGE_HOSTNAME;

use common::ErrorLocation;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Grace period with zero sessions before the idle-exit hook fires.
pub const IDLE_EXIT_GRACE: Duration = Duration::from_secs(1);

const NO_WINDOW_MESSAGE: &str = "no window available";

/// Runs when production mode detects an orphaned bridge (no sessions
/// for a full grace period). The default hook terminates the process;
/// tests inject their own.
pub type IdleExitHook = Arc<dyn Fn() + Send + Sync>;

/// Everything a connection handler needs, cheaply cloneable.
#[derive(Clone)]
pub struct ServerContext {
    pub sessions: SessionRegistry,
    pub windows: WindowManager,
    pub resource_dir: PathBuf,
    pub production: bool,
    pub exit_hook: IdleExitHook,
}

/// Bind the listener and start accepting sessions.
///
/// `port` 0 selects an ephemeral port. Returns the actually bound
/// port, which the embedding process is expected to communicate
/// out-of-band (the startup log carries it too).
///
/// # Errors
///
/// Returns [`RpcError::Io`] if the port cannot be bound.
pub async fn start_rpc_server(port: u16, context: ServerContext) -> Result<u16, RpcError> {
    let address = format!("{BRIDGE_HOSTNAME}:{port}");
    let listener = TcpListener::bind(&address).await?;
    let bound_port = listener.local_addr()?.port();

    info!("Bridge RPC server listening on {BRIDGE_HOSTNAME}:{bound_port}");

    TokioSpawn(async move {
        while let Ok((stream, addr)) = listener.accept().await {
            debug!("Client connecting from {addr}");
            let connection_context = context.clone();
            TokioSpawn(async move {
                if let Err(e) = handle_connection(stream, addr, connection_context).await {
                    debug!("Session from {addr} ended with error: {e}");
                }
            });
        }
    });

    Ok(bound_port)
}

/// Drive one session from handshake to disconnect.
///
/// The session owns no state beyond its registry entry; on disconnect
/// the entry is dropped and, in production mode, the idle-exit grace
/// timer is armed if no session remains.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    context: ServerContext,
) -> Result<(), RpcError> {
    // Localhost bridge only; remote peers are dropped without a reply.
    if !addr.ip().is_loopback() {
        warn!("Rejected non-loopback connection from {addr}");
        return Ok(());
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            error!("WebSocket handshake failed: {e}");
            return Err(RpcError::Handshake {
                message: format!("WebSocket handshake failed: {e}"),
                location: ErrorLocation::caller(),
            });
        }
    };

    let (mut write, mut read) = ws_stream.split();
    let (session_id, response_tx, mut outbound_rx) = context.sessions.register();
    info!("Session {session_id} connected from {addr}");

    // Writer task: serializes all sends for this session. A failed
    // send means the client is gone; nothing is retried or surfaced.
    let writer = TokioSpawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if write.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                handle_frame(text.as_str(), session_id, &response_tx, &context);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                debug!("Session {session_id} sent a non-text frame, ignoring");
            }
            Err(e) => {
                debug!("Session {session_id} read error: {e}");
                break;
            }
        }
    }

    context.sessions.remove(session_id);
    writer.abort();
    info!("Session {session_id} disconnected");

    arm_idle_exit(&context);
    Ok(())
}

/// Decode one inbound frame and route it.
///
/// Protocol errors fail only the frame: they are logged and dropped,
/// and the connection stays open.
fn handle_frame(
    frame: &str,
    session_id: SessionId,
    response_tx: &mpsc::UnboundedSender<Message>,
    context: &ServerContext,
) {
    let message = match codec::decode(frame) {
        Ok(message) => message,
        Err(e) => {
            warn!("Session {session_id} sent a malformed frame, dropping: {e}");
            return;
        }
    };

    match message {
        WireMessage::Call { id, api, cmd, args } => {
            if let Err(e) = context.windows.dispatch_call(&id, &api, &cmd, &args) {
                debug!("Call {id} dropped: {e}");
            }
        }
        WireMessage::ShowLoginWindow { id } => {
            let gate = context.windows.gate().clone();
            let tx = response_tx.clone();
            TokioSpawn(async move {
                match gate.wait_login_window().await {
                    Ok(()) => respond(&tx, &id, ResponseStatus::Fulfilled, WireValue::Undefined),
                    Err(e) => respond(
                        &tx,
                        &id,
                        ResponseStatus::Rejected,
                        WireValue::from(e.to_string()),
                    ),
                }
            });
        }
        WireMessage::GetLastContentId { id } => match context.windows.last_content_id() {
            Some(content_id) => respond(
                response_tx,
                &id,
                ResponseStatus::Fulfilled,
                WireValue::from(content_id),
            ),
            None => respond(
                response_tx,
                &id,
                ResponseStatus::Rejected,
                WireValue::from(NO_WINDOW_MESSAGE),
            ),
        },
        WireMessage::ReadVoiceMessage { id, file } => {
            let resource_dir = context.resource_dir.clone();
            let tx = response_tx.clone();
            TokioSpawn(async move {
                match audio::read_voice_message(&resource_dir, &file).await {
                    Ok(wav) => respond(&tx, &id, ResponseStatus::Fulfilled, WireValue::Bytes(wav)),
                    Err(e) => respond(
                        &tx,
                        &id,
                        ResponseStatus::Rejected,
                        WireValue::from(e.to_string()),
                    ),
                }
            });
        }
        WireMessage::Response { .. } | WireMessage::Event { .. } | WireMessage::Log { .. } => {
            debug!("Session {session_id} sent a server-originated variant, ignoring");
        }
    }
}

/// Wrap a handler outcome and queue it for the originating session only.
fn respond(
    response_tx: &mpsc::UnboundedSender<Message>,
    id: &str,
    status: ResponseStatus,
    value: WireValue,
) {
    let message = WireMessage::Response {
        id: id.to_string(),
        status,
        value,
    };
    match codec::encode(&message) {
        Ok(frame) => {
            let _ = response_tx.send(Message::Text(frame.into()));
        }
        Err(e) => warn!("Dropping unencodable response {id}: {e}"),
    }
}

/// Production policy: an orphaned headless host must not linger after
/// its remote controller disappears.
fn arm_idle_exit(context: &ServerContext) {
    if !context.production || context.sessions.count() > 0 {
        return;
    }
    let sessions = context.sessions.clone();
    let exit_hook = Arc::clone(&context.exit_hook);
    TokioSpawn(async move {
        sleep(IDLE_EXIT_GRACE).await;
        if sessions.count() == 0 {
            warn!("No sessions for {IDLE_EXIT_GRACE:?}, triggering idle exit");
            exit_hook();
        }
    });
}
