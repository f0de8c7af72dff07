use common::ErrorLocation;

use std::io::Error as IoError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RpcError {
    #[error("Handshake Error: {message} {location}")]
    Handshake {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },

    #[error("No Window Available {location}")]
    NoWindow { location: ErrorLocation },
}

impl From<IoError> for RpcError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        RpcError::Io {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
