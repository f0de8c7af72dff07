//! Connected-session registry and broadcast.

use crate::wire::codec;
use crate::wire::message::WireMessage;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

pub type SessionId = u64;

/// Registry of live sessions.
///
/// Session ids are allocated from a monotonically increasing counter;
/// broadcast iterates the map in key order, which fixes the delivery
/// order across the connection set. Each entry is the sending half of
/// the session's writer-task channel, so enqueueing here never blocks
/// and a dead session simply drops what is sent to it.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    next_id: AtomicU64,
    sessions: RwLock<BTreeMap<SessionId, mpsc::UnboundedSender<Message>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                next_id: AtomicU64::new(1),
                sessions: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// Add a session, returning its id, the sender used for targeted
    /// responses, and the receiver the writer task drains.
    pub fn register(
        &self,
    ) -> (
        SessionId,
        mpsc::UnboundedSender<Message>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .sessions
            .write()
            .expect("session registry lock poisoned")
            .insert(id, tx.clone());
        debug!("Session {id} registered");
        (id, tx, rx)
    }

    pub fn remove(&self, id: SessionId) {
        self.inner
            .sessions
            .write()
            .expect("session registry lock poisoned")
            .remove(&id);
        debug!("Session {id} removed");
    }

    pub fn count(&self) -> usize {
        self.inner
            .sessions
            .read()
            .expect("session registry lock poisoned")
            .len()
    }

    /// Send one message to every connected session, in session-id order.
    ///
    /// The frame is encoded once; enqueue failures mean the session is
    /// already gone and are swallowed.
    pub fn broadcast(&self, message: &WireMessage) {
        let frame = match codec::encode(message) {
            Ok(frame) => frame,
            Err(error) => {
                warn!("Dropping unencodable broadcast: {error}");
                return;
            }
        };
        let sessions = self
            .inner
            .sessions
            .read()
            .expect("session registry lock poisoned");
        for (id, tx) in sessions.iter() {
            if tx.send(Message::Text(frame.clone().into())).is_err() {
                debug!("Broadcast to closed session {id} dropped");
            }
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
