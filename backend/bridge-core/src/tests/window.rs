// Unit tests for the window factory, its option patching, and the taps.

use crate::config::LogPolicy;
use crate::gate::{GateState, LoginGate};
use crate::rpc::sessions::SessionRegistry;
use crate::tests::support::StubWindow;
use crate::translate::{META_CALLBACK_ID, META_EVENT_NAME};
use crate::window::{WindowManager, WindowOptions};
use crate::wire::value::WireValue;

use std::sync::Arc;
use std::sync::Mutex;

fn manager(inspector: bool) -> WindowManager {
    WindowManager::new(
        inspector,
        LogPolicy::default(),
        SessionRegistry::new(),
        LoginGate::new(),
    )
}

fn build_stub(manager: &WindowManager, content_id: u32) -> (Arc<StubWindow>, WindowOptions) {
    let stub = Arc::new(StubWindow::new(content_id));
    let seen = Arc::new(Mutex::new(None));
    let native = Arc::clone(&stub);
    let record = Arc::clone(&seen);
    manager.create_window(WindowOptions::default(), move |patched| {
        *record.lock().expect("options record") = Some(patched);
        native
    });
    let patched = seen
        .lock()
        .expect("options record")
        .clone()
        .expect("builder must run");
    (stub, patched)
}

/// **VALUE**: Verifies option patching outside inspector mode: windows
/// are created unshown with native integration forced on.
///
/// **WHY THIS MATTERS**: The interception contract depends on the
/// content process being reachable over the internal channels; a window
/// built without integration is invisible to the whole bridge.
#[test]
fn given_normal_mode_when_window_built_then_options_patched() {
    let windows = manager(false);
    let (_, patched) = build_stub(&windows, 1);

    assert!(!patched.show);
    assert!(patched.native_integration);
}

/// **VALUE**: Verifies inspector mode leaves the requested visibility
/// alone.
#[test]
fn given_inspector_mode_when_window_built_then_show_respected() {
    let windows = manager(true);
    let (stub, patched) = build_stub(&windows, 1);

    assert!(patched.show);
    assert!(patched.native_integration);
    assert!(!stub.was_hidden());
}

/// **VALUE**: Verifies the first window is adopted by the gate and kept
/// intact while every later window has its content hidden.
///
/// **BUG THIS CATCHES**: Would catch the login window being blanked
/// like a background window, which would present the user an empty
/// login screen.
#[test]
fn given_two_windows_when_created_then_only_second_content_hidden() {
    let windows = manager(false);

    let (first, _) = build_stub(&windows, 1);
    assert_eq!(windows.gate().state(), GateState::Opened);
    assert!(!first.was_hidden());

    let (second, _) = build_stub(&windows, 2);
    assert!(second.was_hidden());
    assert_eq!(windows.last_content_id(), Some(2));
}

/// **VALUE**: Verifies call dispatch targets the most recent window and
/// reaches host listeners but never the bridge's own tap.
///
/// **WHY THIS MATTERS**: Re-dispatching a synthesized call into the
/// internal tap would echo bridge traffic back at the sessions forever.
#[test]
fn given_dispatched_call_when_listeners_run_then_internal_tap_skipped() {
    let windows = manager(true);
    build_stub(&windows, 1);
    build_stub(&windows, 2);

    let first_hits = Arc::new(Mutex::new(Vec::new()));
    let second_hits = Arc::new(Mutex::new(Vec::new()));
    {
        let hits = Arc::clone(&first_hits);
        windows.on_inbound(1, move |args| {
            hits.lock().expect("hits").push(args.to_vec());
        });
    }
    {
        let hits = Arc::clone(&second_hits);
        windows.on_inbound(2, move |args| {
            hits.lock().expect("hits").push(args.to_vec());
        });
    }

    windows
        .dispatch_call("x", "chatApi", "send", &[WireValue::from("hi")])
        .expect("a window exists");

    assert!(first_hits.lock().expect("hits").is_empty(), "older window untouched");
    let delivered = second_hits.lock().expect("hits");
    assert_eq!(delivered.len(), 1);
    let meta = &delivered[0][0];
    assert_eq!(
        meta.get(META_EVENT_NAME).and_then(WireValue::as_str),
        Some("ns-chatApi-2")
    );
    assert_eq!(
        meta.get(META_CALLBACK_ID).and_then(WireValue::as_str),
        Some("_!_x")
    );
}

/// **VALUE**: Verifies dispatch with no windows is a typed error, not a
/// panic.
#[test]
fn given_no_windows_when_call_dispatched_then_no_window_error() {
    let windows = manager(false);
    assert!(windows.dispatch_call("x", "a", "b", &[]).is_err());
}

/// **VALUE**: Verifies closing a window removes it from dispatch order
/// and runs the gate transition.
#[test]
fn given_closed_window_when_looked_up_then_gone_and_gate_destroyed() {
    let windows = manager(false);
    build_stub(&windows, 1);
    build_stub(&windows, 2);

    windows.window_closed(2);
    assert_eq!(windows.last_content_id(), Some(1));

    windows.window_closed(1);
    assert_eq!(windows.last_content_id(), None);
    assert_eq!(windows.gate().state(), GateState::Destroyed);
}

/// **VALUE**: Verifies suppressed logging-API traffic is dropped before
/// it reaches the native delivery path, while ordinary traffic always
/// passes through.
///
/// **BUG THIS CATCHES**: Would catch suppression that only filters the
/// broadcast side and still floods the content process.
#[test]
fn given_suppressed_event_when_sent_outbound_then_not_delivered() {
    let windows = manager(false);
    let (stub, _) = build_stub(&windows, 1);
    let window = windows.last_window().expect("window exists");

    let suppressed_meta = WireValue::object([
        ("type", WireValue::from("request")),
        ("eventName", WireValue::from("ns-LoggerApi-1")),
    ]);
    window.send_outbound("IPC_DOWN_1", &[suppressed_meta]);
    assert!(stub.deliveries().is_empty());

    let ordinary_meta = WireValue::object([
        ("type", WireValue::from("request")),
        ("eventName", WireValue::from("ns-ChatApi-1")),
    ]);
    window.send_outbound("IPC_DOWN_1", &[ordinary_meta.clone()]);
    let deliveries = stub.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, "IPC_DOWN_1");
    assert_eq!(deliveries[0].1, vec![ordinary_meta]);
}

/// **VALUE**: Verifies a listener may register another listener from
/// inside its own callback without deadlocking the registry.
///
/// **WHY THIS MATTERS**: Register-style host handlers do exactly this:
/// the handler for a subscription request installs the subscription's
/// listener. Callbacks therefore must run with no registry lock held.
///
/// **BUG THIS CATCHES**: Would catch `raise_inbound` invoking callbacks
/// under the listener-map read guard, which blocks the nested
/// registration's write lock forever.
#[test]
fn given_listener_registering_listener_when_raised_then_returns_and_new_listener_live() {
    let windows = manager(false);
    build_stub(&windows, 1);

    let nested_hits = Arc::new(Mutex::new(0_u32));
    {
        let manager = windows.clone();
        let hits = Arc::clone(&nested_hits);
        windows.on_inbound(1, move |_| {
            let hits = Arc::clone(&hits);
            manager.on_inbound(1, move |_| {
                *hits.lock().expect("hits") += 1;
            });
        });
    }

    // Must return; the nested listener only sees later traffic.
    windows.raise_inbound(1, &[WireValue::from("first")]);
    assert_eq!(*nested_hits.lock().expect("hits"), 0);

    windows.raise_inbound(1, &[WireValue::from("second")]);
    assert!(*nested_hits.lock().expect("hits") >= 1);
}

/// **VALUE**: Verifies a listener may close its own window from inside
/// its callback.
///
/// **BUG THIS CATCHES**: Would catch the listener-map write lock in
/// `window_closed` deadlocking against a read guard still held across
/// the callback.
#[test]
fn given_listener_closing_window_when_raised_then_window_removed() {
    let windows = manager(false);
    build_stub(&windows, 1);

    {
        let manager = windows.clone();
        windows.on_inbound(1, move |_| {
            manager.window_closed(1);
        });
    }

    windows.raise_inbound(1, &[WireValue::from("bye")]);
    assert_eq!(windows.last_content_id(), None);
    assert_eq!(windows.gate().state(), GateState::Destroyed);
}

/// **VALUE**: Verifies the window's show path is a no-op outside
/// inspector mode and real in it.
#[test]
fn given_show_called_then_only_inspector_mode_reaches_native() {
    let hidden = manager(false);
    let (stub, _) = build_stub(&hidden, 1);
    hidden.last_window().expect("window").show();
    assert!(!stub.was_shown());

    let visible = manager(true);
    let (stub, _) = build_stub(&visible, 1);
    visible.last_window().expect("window").show();
    assert!(stub.was_shown());
}
