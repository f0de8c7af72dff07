//! Wire protocol: value model, message union, and codec.
//!
//! Each WebSocket text frame carries exactly one [`WireMessage`],
//! serialized through a flat node-table encoding that can represent
//! values plain JSON cannot: `undefined`, binary buffers, and shared
//! or cyclic references (see [`codec`]).

pub mod codec;
pub mod message;
pub mod value;

pub use message::{ResponseStatus, WireMessage};
pub use value::WireValue;
