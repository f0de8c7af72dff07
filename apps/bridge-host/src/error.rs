use bridge_core::error::CoreError;

use common::ErrorLocation;

use thiserror::Error;

/// Errors that can occur while running the host process.
#[derive(Debug, Error)]
pub enum HostError {
    /// Error from the host itself (filesystem, logging setup)
    #[error("Host Error: {message} {location}")]
    Host {
        message: String,
        location: ErrorLocation,
    },

    /// Error from bridge-core operations (install, config)
    #[error(transparent)]
    Core(#[from] CoreError),
}
