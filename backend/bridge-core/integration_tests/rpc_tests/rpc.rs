use crate::rpc_tests::helpers::{
    connect_client, create_stub_window, receive_wire, send_wire, start_test_bridge,
    start_test_bridge_with,
};

use bridge_core::wire::message::{ResponseStatus, WireMessage};
use bridge_core::wire::value::WireValue;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message;

/// **VALUE**: Verifies that `get-last-content-id` resolves with the most
/// recent window's id and rejects when no window exists yet.
///
/// **WHY THIS MATTERS**: Clients derive every event subscription name
/// from this id. If it points at a stale window or resolves before any
/// window exists, every subscription that follows is dead on arrival.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The rejection path panics instead of answering
/// - Window registration order is lost and the wrong id is returned
/// - Responses go to the wrong session or never arrive
#[tokio::test]
async fn given_windows_when_last_content_id_requested_then_latest_or_rejected() {
    // GIVEN: A bridge with no windows
    let bridge = start_test_bridge(false).await;
    let mut ws = connect_client(bridge.port()).await;

    // WHEN: The id is requested before any window exists
    send_wire(
        &mut ws,
        &WireMessage::GetLastContentId {
            id: "q1".to_string(),
        },
    )
    .await;

    // THEN: The request is rejected
    let response = receive_wire(&mut ws).await;
    assert_eq!(
        response,
        WireMessage::Response {
            id: "q1".to_string(),
            status: ResponseStatus::Rejected,
            value: WireValue::from("no window available"),
        }
    );

    // WHEN: Two windows exist and the id is requested again
    create_stub_window(bridge.windows(), 11);
    create_stub_window(bridge.windows(), 12);
    send_wire(
        &mut ws,
        &WireMessage::GetLastContentId {
            id: "q2".to_string(),
        },
    )
    .await;

    // THEN: The most recently created window wins
    let response = receive_wire(&mut ws).await;
    assert_eq!(
        response,
        WireMessage::Response {
            id: "q2".to_string(),
            status: ResponseStatus::Fulfilled,
            value: WireValue::from(12_u32),
        }
    );
}

/// **VALUE**: Verifies a wire `call` is synthesized into the internal
/// event convention and lands on host listeners of the latest window.
///
/// **WHY THIS MATTERS**: This is the entire forward path of the RPC:
/// remote call in, internal event out. The host answers through the
/// outbound tap, so nothing else confirms delivery.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Calls are dispatched to the wrong window
/// - The callback marker or event name convention drifts
/// - The server answers calls itself instead of staying silent
#[tokio::test]
async fn given_call_frame_when_sent_then_host_listener_receives_synthesized_event() {
    // GIVEN: A bridge with one window and one host listener
    let bridge = start_test_bridge(false).await;
    create_stub_window(bridge.windows(), 5);

    let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();
    bridge.windows().on_inbound(5, move |args| {
        let _ = seen_tx.send(args.to_vec());
    });

    // WHEN: A client sends a call
    let mut ws = connect_client(bridge.port()).await;
    send_wire(
        &mut ws,
        &WireMessage::Call {
            id: "c9".to_string(),
            api: "chatApi".to_string(),
            cmd: "send".to_string(),
            args: vec![WireValue::from("hello")],
        },
    )
    .await;

    // THEN: The listener receives [meta, [cmd, ...args]]
    let received = tokio::time::timeout(Duration::from_secs(5), seen_rx.recv())
        .await
        .expect("Timed out waiting for dispatch")
        .expect("Listener channel closed");
    assert_eq!(received.len(), 2);
    let meta = &received[0];
    assert_eq!(
        meta.get("eventName").and_then(WireValue::as_str),
        Some("ns-chatApi-5")
    );
    assert_eq!(
        meta.get("callbackId").and_then(WireValue::as_str),
        Some("_!_c9")
    );
    assert_eq!(
        received[1],
        WireValue::Array(vec![WireValue::from("send"), WireValue::from("hello")])
    );
}

/// **VALUE**: Verifies classified outbound traffic is broadcast to every
/// connected session, byte-identical.
///
/// **WHY THIS MATTERS**: Multiple clients may watch one host; events are
/// fan-out, not request-scoped. A registry that forgets a session or
/// re-encodes per client would desynchronize watchers.
#[tokio::test]
async fn given_two_sessions_when_event_classified_then_both_receive_it() {
    // GIVEN: A bridge, a window, and two connected clients
    let bridge = start_test_bridge(false).await;
    let stub = create_stub_window(bridge.windows(), 3);
    let mut first = connect_client(bridge.port()).await;
    let mut second = connect_client(bridge.port()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    // WHEN: The window emits event-shaped outbound traffic
    let meta = WireValue::object([
        ("type", WireValue::from("request")),
        ("callbackId", WireValue::from("h1")),
        ("eventName", WireValue::from("ns-presenceApi-3")),
    ]);
    let body = WireValue::Array(vec![WireValue::object([
        ("cmdName", WireValue::from("statusChanged")),
        ("payload", WireValue::from("online")),
    ])]);
    let window = bridge.windows().last_window().expect("window exists");
    window.send_outbound("IPC_DOWN_3", &[meta, body]);

    // THEN: Both sessions receive the same classified event
    let expected = WireMessage::Event {
        api: "presenceApi".to_string(),
        cmd: "statusChanged".to_string(),
        payload: WireValue::from("online"),
    };
    assert_eq!(receive_wire(&mut first).await, expected);
    assert_eq!(receive_wire(&mut second).await, expected);

    // AND: Classification never swallowed the original delivery
    assert_eq!(stub.deliveries().len(), 1);
}

/// **VALUE**: Verifies a malformed frame is dropped without tearing the
/// session down.
///
/// **WHY THIS MATTERS**: One buggy client frame must not cost the client
/// its connection and all its pending work; protocol errors fail the
/// frame, never the session.
#[tokio::test]
async fn given_malformed_frame_when_sent_then_session_survives() {
    // GIVEN: A connected client
    let bridge = start_test_bridge(false).await;
    create_stub_window(bridge.windows(), 2);
    let mut ws = connect_client(bridge.port()).await;

    // WHEN: The client sends garbage, then a valid request
    ws.send(Message::Text("this is not a frame".into()))
        .await
        .expect("send garbage");
    send_wire(
        &mut ws,
        &WireMessage::GetLastContentId {
            id: "after".to_string(),
        },
    )
    .await;

    // THEN: The valid request is still answered
    let response = receive_wire(&mut ws).await;
    assert_eq!(
        response,
        WireMessage::Response {
            id: "after".to_string(),
            status: ResponseStatus::Fulfilled,
            value: WireValue::from(2_u32),
        }
    );
}

/// **VALUE**: Verifies `show-login-window` against a destroyed login
/// window rejects with the closed-window message instead of re-opening.
///
/// **WHY THIS MATTERS**: Destruction is terminal. A client that asks
/// again after the user closed the login window must get a clean
/// rejection it can surface, not a hang or a resurrected window.
#[tokio::test]
async fn given_destroyed_login_window_when_show_requested_then_rejected() {
    // GIVEN: A bridge whose login window was created and closed
    let bridge = start_test_bridge(false).await;
    create_stub_window(bridge.windows(), 7);
    bridge.windows().window_closed(7);

    // WHEN: A client requests the login window
    let mut ws = connect_client(bridge.port()).await;
    send_wire(
        &mut ws,
        &WireMessage::ShowLoginWindow {
            id: "s1".to_string(),
        },
    )
    .await;

    // THEN: The request is rejected with the closed message
    let response = receive_wire(&mut ws).await;
    assert_eq!(
        response,
        WireMessage::Response {
            id: "s1".to_string(),
            status: ResponseStatus::Rejected,
            value: WireValue::from("login window already closed"),
        }
    );
}

/// **VALUE**: Verifies `show-login-window` against an open login window
/// unhides it and resolves once the window is destroyed.
#[tokio::test]
async fn given_open_login_window_when_show_requested_then_resolves_on_close() {
    // GIVEN: A bridge with its login window open
    let bridge = start_test_bridge(false).await;
    let stub = create_stub_window(bridge.windows(), 7);

    // WHEN: A client requests the login window
    let mut ws = connect_client(bridge.port()).await;
    send_wire(
        &mut ws,
        &WireMessage::ShowLoginWindow {
            id: "s2".to_string(),
        },
    )
    .await;

    // THEN: The window is shown, and the response arrives on close
    tokio::time::timeout(Duration::from_secs(5), async {
        while !stub.was_shown() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Login window was never shown");

    bridge.windows().window_closed(7);
    let response = receive_wire(&mut ws).await;
    assert_eq!(
        response,
        WireMessage::Response {
            id: "s2".to_string(),
            status: ResponseStatus::Fulfilled,
            value: WireValue::Undefined,
        }
    );
}

/// **VALUE**: Verifies `read-voice-message` turns a transcoding failure
/// into a rejection carrying the error text.
///
/// **WHY THIS MATTERS**: The codec is an external binary; it will be
/// missing or broken in the field. That must reach the client as a
/// rejected promise, not kill the server or the session.
#[tokio::test]
async fn given_missing_codec_when_voice_message_read_then_rejected() {
    // GIVEN: A bridge whose resource dir has no codec binary
    let bridge = start_test_bridge(false).await;
    let mut ws = connect_client(bridge.port()).await;

    // WHEN: A client requests a voice-message transcode
    send_wire(
        &mut ws,
        &WireMessage::ReadVoiceMessage {
            id: "v1".to_string(),
            file: "/nonexistent/voice.amr".to_string(),
        },
    )
    .await;

    // THEN: The request is rejected with a diagnostic string
    let response = receive_wire(&mut ws).await;
    let WireMessage::Response { id, status, value } = response else {
        panic!("Expected a response frame");
    };
    assert_eq!(id, "v1");
    assert_eq!(status, ResponseStatus::Rejected);
    assert!(
        value.as_str().is_some_and(|text| !text.is_empty()),
        "Rejection must carry a diagnostic"
    );
}

/// **VALUE**: Verifies the production idle-exit policy: the hook fires
/// only after the last session has been gone for the full grace period.
///
/// **WHY THIS MATTERS**: A headless production host with no controller
/// left is an orphan that would linger forever; but exiting while any
/// session remains, or before the grace elapses, kills live clients.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The grace timer ignores sessions that connected during the wait
/// - Any disconnect (rather than the last) arms the exit
/// - Development mode triggers the policy
#[tokio::test]
async fn given_production_bridge_when_last_session_leaves_then_idle_exit_fires() {
    // GIVEN: A production bridge with an observable exit hook
    let exited = Arc::new(AtomicBool::new(false));
    let hook_flag = Arc::clone(&exited);
    let bridge =
        start_test_bridge_with(false, true, Arc::new(move || {
            hook_flag.store(true, Ordering::SeqCst);
        }))
        .await;

    // GIVEN: Two connected sessions
    let first = connect_client(bridge.port()).await;
    let second = connect_client(bridge.port()).await;

    // WHEN: Only one disconnects
    drop(first);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // THEN: The hook does not fire while a session remains
    assert!(!exited.load(Ordering::SeqCst));

    // WHEN: The last session disconnects and the grace period passes
    drop(second);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // THEN: The hook fires
    assert!(exited.load(Ordering::SeqCst));
}

/// **VALUE**: Verifies a development bridge never arms the idle exit.
#[tokio::test]
async fn given_development_bridge_when_sessions_leave_then_no_idle_exit() {
    let exited = Arc::new(AtomicBool::new(false));
    let hook_flag = Arc::clone(&exited);
    let bridge =
        start_test_bridge_with(false, false, Arc::new(move || {
            hook_flag.store(true, Ordering::SeqCst);
        }))
        .await;

    let ws = connect_client(bridge.port()).await;
    drop(ws);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(!exited.load(Ordering::SeqCst));
}

/// **VALUE**: Verifies the inspector tap re-exposes unclassified inbound
/// traffic as `log` frames while still honoring the suppression policy.
///
/// **WHY THIS MATTERS**: Inspector mode exists to watch raw internal
/// traffic; the logging API's own chatter would feed back into itself
/// and drown the stream if the policy were skipped on this path.
#[tokio::test]
async fn given_inspector_bridge_when_inbound_raised_then_logged_except_suppressed() {
    // GIVEN: An inspector bridge with a window and a connected client
    let bridge = start_test_bridge(true).await;
    create_stub_window(bridge.windows(), 4);
    let mut ws = connect_client(bridge.port()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    // WHEN: Suppressed traffic arrives first, ordinary traffic second
    let suppressed = WireValue::object([
        ("type", WireValue::from("request")),
        ("eventName", WireValue::from("ns-LoggerApi-4")),
    ]);
    bridge.windows().raise_inbound(4, &[suppressed]);

    let ordinary = WireValue::object([
        ("type", WireValue::from("request")),
        ("eventName", WireValue::from("ns-ChatApi-4")),
    ]);
    bridge.windows().raise_inbound(4, &[ordinary.clone()]);

    // THEN: The first log frame to arrive is the ordinary traffic;
    // the suppressed event never produced one.
    let logged = receive_wire(&mut ws).await;
    assert_eq!(
        logged,
        WireMessage::Log {
            raw: WireValue::Array(vec![ordinary]),
        }
    );
}
