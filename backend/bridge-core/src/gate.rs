//! Visibility gate for the singleton login window.
//!
//! Exactly one window ever serves this role: the first window created
//! after bridge installation. The gate is an explicitly owned state
//! object handed to the window manager and the RPC server at
//! construction; state transitions are monotonic forward and
//! `Destroyed` is terminal. A `ShowLoginWindow` request arriving after
//! destruction always fails, it never re-opens.

use crate::error::gate::GateError;
use crate::window::{ContentId, HostWindow};

use std::sync::{Arc, Mutex as StdMutex};

use log::{debug, info};
use tokio::sync::watch;
use tokio::time::{Duration, sleep};

/// Polling budget for a `ShowLoginWindow` wait in the `NeverShown` state.
pub const LOGIN_WAIT_RETRIES: u32 = 10;
/// Interval between polls.
pub const LOGIN_WAIT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    NeverShown,
    Opened,
    Destroyed,
}

/// Shared handle to the process-wide login gate.
#[derive(Clone)]
pub struct LoginGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    state_tx: watch::Sender<GateState>,
    window: StdMutex<Option<Arc<dyn HostWindow>>>,
}

impl LoginGate {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(GateState::NeverShown);
        Self {
            inner: Arc::new(GateInner {
                state_tx,
                window: StdMutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> GateState {
        *self.inner.state_tx.borrow()
    }

    /// Record the gated window at construction time.
    ///
    /// Only the first window created while the gate is `NeverShown` is
    /// adopted; construction counts as "available" independent of
    /// actual visibility. Returns whether this window now holds the role.
    pub fn adopt_window(&self, native: Arc<dyn HostWindow>) -> bool {
        if self.state() != GateState::NeverShown {
            return false;
        }
        let content_id = native.content_id();
        *self.inner.window.lock().expect("gate window lock poisoned") = Some(native);
        self.inner.state_tx.send_replace(GateState::Opened);
        info!("Login gate opened for window {content_id}");
        true
    }

    /// Transition to `Destroyed` when the gated window closes.
    ///
    /// Windows that never held the role are ignored.
    pub fn window_destroyed(&self, content_id: ContentId) {
        let mut guard = self.inner.window.lock().expect("gate window lock poisoned");
        let is_gated = guard
            .as_ref()
            .is_some_and(|window| window.content_id() == content_id);
        if !is_gated {
            return;
        }
        *guard = None;
        drop(guard);
        self.inner.state_tx.send_replace(GateState::Destroyed);
        info!("Login gate destroyed, window {content_id} closed");
    }

    /// Full `ShowLoginWindow` semantics.
    ///
    /// `Opened`: unhide the gated window immediately and resolve once it
    /// is later closed. `Destroyed`: reject. `NeverShown`: poll once per
    /// [`LOGIN_WAIT_INTERVAL`] up to [`LOGIN_WAIT_RETRIES`] times for the
    /// gate to open, rejecting when the budget is exhausted.
    pub async fn wait_login_window(&self) -> Result<(), GateError> {
        match self.state() {
            GateState::Opened => self.show_and_wait_closed().await,
            GateState::Destroyed => Err(GateError::AlreadyClosed),
            GateState::NeverShown => {
                let mut retries_left = LOGIN_WAIT_RETRIES;
                while retries_left > 0 {
                    retries_left -= 1;
                    sleep(LOGIN_WAIT_INTERVAL).await;
                    if self.state() == GateState::Opened {
                        return self.show_and_wait_closed().await;
                    }
                }
                debug!("Login window wait exhausted its retry budget");
                Err(GateError::LoadTimeout)
            }
        }
    }

    async fn show_and_wait_closed(&self) -> Result<(), GateError> {
        {
            let guard = self.inner.window.lock().expect("gate window lock poisoned");
            if let Some(window) = guard.as_ref() {
                window.show();
            }
        }
        let mut state_rx = self.inner.state_tx.subscribe();
        loop {
            if *state_rx.borrow_and_update() == GateState::Destroyed {
                return Ok(());
            }
            if state_rx.changed().await.is_err() {
                // Gate dropped while waiting; treat as closed.
                return Ok(());
            }
        }
    }
}

impl Default for LoginGate {
    fn default() -> Self {
        Self::new()
    }
}
