//! Test helpers for bridge RPC integration tests.
//!
//! This module provides utilities for testing the bridge over a real
//! WebSocket connection:
//! - Installing a bridge on an ephemeral port
//! - Sending/receiving wire frames
//! - A recording stand-in for the host's native window

use bridge_core::Bridge;
use bridge_core::config::{BridgeConfig, EPHEMERAL_PORT, LogPolicy};
use bridge_core::rpc::server::IdleExitHook;
use bridge_core::window::{ContentId, HostWindow, WindowManager, WindowOptions};
use bridge_core::wire::codec::{decode, encode};
use bridge_core::wire::message::WireMessage;
use bridge_core::wire::value::WireValue;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type TestSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test helper: Install a bridge on an ephemeral port.
pub async fn start_test_bridge(inspector: bool) -> Bridge {
    start_test_bridge_with(inspector, false, Arc::new(|| {})).await
}

/// Test helper: Install a bridge with full control over production mode
/// and the idle-exit hook.
pub async fn start_test_bridge_with(
    inspector: bool,
    production: bool,
    exit_hook: IdleExitHook,
) -> Bridge {
    let config = BridgeConfig {
        port: EPHEMERAL_PORT,
        inspector,
        production,
        resource_dir: PathBuf::from("."),
    };
    Bridge::install_with_exit_hook(config, LogPolicy::default(), exit_hook)
        .await
        .expect("Failed to install bridge")
}

/// Test helper: Connect a wire client to a running bridge.
pub async fn connect_client(port: u16) -> TestSocket {
    let url = format!("{}:{}", bridge_core::BRIDGE_WS_BASE_URL, port);
    let (ws_stream, _) = connect_async(&url)
        .await
        .expect("Failed to connect to bridge");
    ws_stream
}

/// Test helper: Encode and send one wire message.
pub async fn send_wire(ws: &mut TestSocket, message: &WireMessage) {
    let frame = encode(message).expect("Failed to encode frame");
    ws.send(Message::Text(frame.into()))
        .await
        .expect("Failed to send frame");
}

/// Test helper: Receive and decode the next wire message, skipping
/// non-text frames.
pub async fn receive_wire(ws: &mut TestSocket) -> WireMessage {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Connection closed while waiting for a frame")
            .expect("Error receiving frame");
        if let Message::Text(text) = frame {
            return decode(text.as_str()).expect("Failed to decode frame");
        }
    }
}

/// A recording stand-in for the host's native window.
pub struct StubWindow {
    content_id: ContentId,
    shown: AtomicBool,
    delivered: Mutex<Vec<(String, Vec<WireValue>)>>,
}

impl StubWindow {
    pub fn new(content_id: ContentId) -> Self {
        Self {
            content_id,
            shown: AtomicBool::new(false),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn was_shown(&self) -> bool {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn deliveries(&self) -> Vec<(String, Vec<WireValue>)> {
        self.delivered.lock().expect("delivered lock").clone()
    }
}

impl HostWindow for StubWindow {
    fn content_id(&self) -> ContentId {
        self.content_id
    }

    fn show(&self) {
        self.shown.store(true, Ordering::SeqCst);
    }

    fn hide_content(&self) {}

    fn deliver(&self, channel: &str, args: &[WireValue]) {
        self.delivered
            .lock()
            .expect("delivered lock")
            .push((channel.to_string(), args.to_vec()));
    }
}

/// Test helper: Create one stub-backed window through the manager.
pub fn create_stub_window(windows: &WindowManager, content_id: ContentId) -> Arc<StubWindow> {
    let stub = Arc::new(StubWindow::new(content_id));
    let native = Arc::clone(&stub);
    windows.create_window(WindowOptions::default(), move |_| native);
    stub
}
