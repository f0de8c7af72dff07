//! WebSocket RPC surface of the bridge.
//!
//! `server` owns the listener and per-connection loops; `sessions`
//! tracks connected clients and implements ordered broadcast.

pub mod server;
pub mod sessions;

pub use server::{IdleExitHook, ServerContext, start_rpc_server};
pub use sessions::{SessionId, SessionRegistry};
