//! The window factory and its taps.

use crate::config::LogPolicy;
use crate::error::rpc::RpcError;
use crate::gate::LoginGate;
use crate::rpc::sessions::SessionRegistry;
use crate::translate;
use crate::window::{ContentId, HostWindow, WindowOptions};
use crate::wire::message::WireMessage;
use crate::wire::value::WireValue;

use common::ErrorLocation;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::{debug, info};

type ListenerFn = Arc<dyn Fn(&[WireValue]) + Send + Sync>;

/// One registered inbound-channel listener.
///
/// The bridge's own taps are marked internal so call re-dispatch can
/// skip them and never feed the bridge its own traffic back.
struct InboundListener {
    internal: bool,
    func: ListenerFn,
}

/// Factory and registry for intercepted windows.
///
/// All window-list and listener mutations go through `&self` methods
/// behind writer locks; critical sections never await.
#[derive(Clone)]
pub struct WindowManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    inspector: bool,
    policy: LogPolicy,
    sessions: SessionRegistry,
    gate: LoginGate,
    windows: RwLock<Vec<Arc<BridgeWindow>>>,
    listeners: RwLock<HashMap<ContentId, Vec<InboundListener>>>,
}

impl WindowManager {
    pub fn new(
        inspector: bool,
        policy: LogPolicy,
        sessions: SessionRegistry,
        gate: LoginGate,
    ) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                inspector,
                policy,
                sessions,
                gate,
                windows: RwLock::new(Vec::new()),
                listeners: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn gate(&self) -> &LoginGate {
        &self.inner.gate
    }

    /// Create one intercepted window.
    ///
    /// `build` constructs the host's native window from the patched
    /// options. The first window created while the gate is `NeverShown`
    /// becomes the gated login window: it sizes and lays out normally
    /// but its show path is suppressed and captured for the gate. Every
    /// later window gets its content hidden outright. In inspector mode
    /// windows behave ordinarily.
    pub fn create_window<F>(&self, options: WindowOptions, build: F) -> Arc<BridgeWindow>
    where
        F: FnOnce(WindowOptions) -> Arc<dyn HostWindow>,
    {
        let inspector = self.inner.inspector;
        let patched = WindowOptions {
            show: if inspector { options.show } else { false },
            native_integration: true,
        };
        let native = build(patched);
        let content_id = native.content_id();

        let gated = self.inner.gate.adopt_window(Arc::clone(&native));
        if !gated && !inspector {
            native.hide_content();
        }

        self.install_inbound_tap(content_id);

        let window = Arc::new(BridgeWindow {
            native,
            content_id,
            inspector,
            policy: self.inner.policy.clone(),
            sessions: self.inner.sessions.clone(),
        });
        self.inner
            .windows
            .write()
            .expect("window list lock poisoned")
            .push(Arc::clone(&window));
        info!("Window {content_id} created (gated: {gated}, inspector: {inspector})");
        window
    }

    /// Deregister a closed window and run the gate transition.
    pub fn window_closed(&self, content_id: ContentId) {
        self.inner
            .listeners
            .write()
            .expect("listener map lock poisoned")
            .remove(&content_id);
        self.inner
            .windows
            .write()
            .expect("window list lock poisoned")
            .retain(|window| window.content_id != content_id);
        self.inner.gate.window_destroyed(content_id);
        info!("Window {content_id} closed");
    }

    pub fn last_window(&self) -> Option<Arc<BridgeWindow>> {
        self.inner
            .windows
            .read()
            .expect("window list lock poisoned")
            .last()
            .cloned()
    }

    pub fn last_content_id(&self) -> Option<ContentId> {
        self.last_window().map(|window| window.content_id)
    }

    /// Host-facing registration on a window's inbound channel.
    pub fn on_inbound<F>(&self, content_id: ContentId, listener: F)
    where
        F: Fn(&[WireValue]) + Send + Sync + 'static,
    {
        self.push_listener(content_id, false, Arc::new(listener));
    }

    /// Deliver content-process traffic up its window's inbound channel.
    ///
    /// Invokes every listener, the bridge's tap included; this is the
    /// host's normal inbound path. Listeners may re-enter the manager
    /// (register more listeners, close windows), so the snapshot is
    /// taken first and callbacks run with no lock held. A listener
    /// added mid-raise sees only later traffic.
    pub fn raise_inbound(&self, content_id: ContentId, args: &[WireValue]) {
        for func in self.snapshot_listeners(content_id, false) {
            func(args);
        }
    }

    /// Dispatch a wire `Call` into the most-recently-created window.
    ///
    /// The synthesized internal event goes to every non-internal
    /// listener on that window's inbound channel. No response is
    /// produced here; the host answers through the outbound tap.
    #[track_caller]
    pub fn dispatch_call(
        &self,
        id: &str,
        api: &str,
        cmd: &str,
        args: &[WireValue],
    ) -> Result<(), RpcError> {
        let content_id = self.last_content_id().ok_or(RpcError::NoWindow {
            location: ErrorLocation::caller(),
        })?;
        let message = translate::synthesize_call(id, api, cmd, args, content_id);

        for func in self.snapshot_listeners(content_id, true) {
            func(&message);
        }
        Ok(())
    }

    /// Clone a window's listener callbacks out of the registry so they
    /// can be invoked without holding the lock.
    fn snapshot_listeners(&self, content_id: ContentId, skip_internal: bool) -> Vec<ListenerFn> {
        let listeners = self
            .inner
            .listeners
            .read()
            .expect("listener map lock poisoned");
        listeners
            .get(&content_id)
            .map(|registered| {
                registered
                    .iter()
                    .filter(|listener| !(skip_internal && listener.internal))
                    .map(|listener| Arc::clone(&listener.func))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The bridge's own inbound tap: in inspector mode, anything that
    /// is not logging-API traffic is re-exposed as a `Log` broadcast.
    fn install_inbound_tap(&self, content_id: ContentId) {
        let inspector = self.inner.inspector;
        let policy = self.inner.policy.clone();
        let sessions = self.inner.sessions.clone();
        self.push_listener(
            content_id,
            true,
            Arc::new(move |args: &[WireValue]| {
                if !inspector {
                    return;
                }
                if let Some(event_name) = translate::outbound_event_name(args) {
                    if policy.is_suppressed(event_name) {
                        return;
                    }
                }
                sessions.broadcast(&WireMessage::Log {
                    raw: WireValue::Array(args.to_vec()),
                });
            }),
        );
    }

    fn push_listener(&self, content_id: ContentId, internal: bool, func: ListenerFn) {
        self.inner
            .listeners
            .write()
            .expect("listener map lock poisoned")
            .entry(content_id)
            .or_default()
            .push(InboundListener { internal, func });
    }
}

/// One intercepted window.
pub struct BridgeWindow {
    native: Arc<dyn HostWindow>,
    content_id: ContentId,
    inspector: bool,
    policy: LogPolicy,
    sessions: SessionRegistry,
}

impl BridgeWindow {
    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    /// Policy-filtered show: ordinary in inspector mode, a no-op
    /// otherwise. The gate keeps its own handle to the captured native
    /// show path for the login flow.
    pub fn show(&self) {
        if self.inspector {
            self.native.show();
        } else {
            debug!("Window {} show suppressed", self.content_id);
        }
    }

    /// The window's tapped outbound-message path.
    ///
    /// Suppressed logging-API traffic is dropped entirely. Everything
    /// else is classified and broadcast to all sessions, then always
    /// handed to the original delivery path, which classification never
    /// blocks or alters.
    pub fn send_outbound(&self, channel: &str, args: &[WireValue]) {
        if let Some(event_name) = translate::outbound_event_name(args) {
            if self.policy.is_suppressed(event_name) {
                debug!("Dropped suppressed outbound event {event_name}");
                return;
            }
        }
        if let Some(message) =
            translate::classify_outbound(channel, args, self.content_id, self.inspector)
        {
            self.sessions.broadcast(&message);
        }
        self.native.deliver(channel, args);
    }
}
