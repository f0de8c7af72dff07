//! Core of the hostbridge: exposes a desktop host application's
//! windowing and inter-process traffic over a WebSocket RPC channel,
//! plus the voice-message transcoding pipeline.
//!
//! The host embeds this crate and drives it through two entry points:
//! [`Bridge::install`] (start the RPC server and window interception)
//! and [`config::LogPolicy::load`] (per-window logging policy). Remote
//! clients connect to the reported port and speak the wire protocol
//! defined in [`wire`].

pub mod audio;
pub mod config;
pub mod error;
pub mod gate;
pub mod rpc;
pub mod translate;
pub mod window;
pub mod wire;

mod bridge;

#[cfg(test)]
mod tests;

pub use bridge::Bridge;

pub const BRIDGE_HOSTNAME: &str = "127.0.0.1";
pub const BRIDGE_WS_BASE_URL: &str = const_format::concatcp!("ws://", BRIDGE_HOSTNAME);
