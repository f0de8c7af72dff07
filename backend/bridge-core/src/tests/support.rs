//! Shared test doubles.

use crate::window::{ContentId, HostWindow};
use crate::wire::value::WireValue;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A recording stand-in for the host's native window.
pub struct StubWindow {
    content_id: ContentId,
    shown: AtomicBool,
    hidden: AtomicBool,
    delivered: Mutex<Vec<(String, Vec<WireValue>)>>,
}

impl StubWindow {
    pub fn new(content_id: ContentId) -> Self {
        Self {
            content_id,
            shown: AtomicBool::new(false),
            hidden: AtomicBool::new(false),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn was_shown(&self) -> bool {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn was_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
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

    fn hide_content(&self) {
        self.hidden.store(true, Ordering::SeqCst);
    }

    fn deliver(&self, channel: &str, args: &[WireValue]) {
        self.delivered
            .lock()
            .expect("delivered lock")
            .push((channel.to_string(), args.to_vec()));
    }
}
