use common::ErrorLocation;

use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TranscodeError {
    #[error("Codec Spawn Error: {path:?}: {source} {location}")]
    Spawn {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Codec Wait Error: {source} {location}")]
    Wait {
        location: ErrorLocation,
        #[source]
        source: std::io::Error,
    },

    #[error("Codec Output Read Error: {path:?}: {source} {location}")]
    ReadOutput {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
