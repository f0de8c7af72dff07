//! Window interception.
//!
//! The bridge never owns windows; the host does. Hosts request windows
//! through [`manager::WindowManager::create_window`], which applies the
//! visibility policy, wires the outbound and inbound taps, and manages
//! the login-gate transition for the first window created.

pub mod manager;

pub use manager::{BridgeWindow, WindowManager};

use crate::wire::value::WireValue;

/// Stable numeric identifier of a window's content process.
pub type ContentId = u32;

/// The host-side window surface the bridge observes.
///
/// `deliver` is the window's original outbound-message path; the
/// bridge's tap classifies traffic first and then always invokes it,
/// except for suppressed logging-API messages.
pub trait HostWindow: Send + Sync {
    fn content_id(&self) -> ContentId;

    /// Make the window visible. Captured by the gate for the login
    /// window; a no-op path for every other non-inspector window.
    fn show(&self);

    /// Hide all rendered content outright.
    fn hide_content(&self);

    /// Original delivery of an outbound message to the content process.
    fn deliver(&self, channel: &str, args: &[WireValue]);
}

/// Window-creation request as the host would issue it.
///
/// The factory patches these before the native window is built:
/// native integration is forced on (internal inter-process plumbing
/// must behave exactly as in a normal in-app window) and visibility
/// follows the interception policy.
#[derive(Debug, Clone, Copy)]
pub struct WindowOptions {
    pub show: bool,
    pub native_integration: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            show: true,
            native_integration: false,
        }
    }
}
