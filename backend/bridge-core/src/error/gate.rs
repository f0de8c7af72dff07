use thiserror::Error;

/// Login-window wait failures.
///
/// Unlike the other error enums these carry no [`common::ErrorLocation`]:
/// their display strings travel over the wire as the rejected value of a
/// `ShowLoginWindow` response, so they stay plain descriptive messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("login window already closed")]
    AlreadyClosed,

    #[error("login window load timeout")]
    LoadTimeout,
}
