use common::ErrorLocation;


use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum WireError {
    #[error("Wire Json Error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
    },

    #[error("Wire Unknown Message Type: {found} {location}")]
    UnknownMessageType {
        found: String,
        location: ErrorLocation,
    },

    #[error("Wire Missing Field: {field} {location}")]
    MissingField {
        field: &'static str,
        location: ErrorLocation,
    },

    #[error("Wire Bad Field: {field}: {reason} {location}")]
    BadField {
        field: &'static str,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Wire Empty Encoding {location}")]
    EmptyEncoding { location: ErrorLocation },

    #[error("Wire Bad Node Reference: {index} {location}")]
    BadReference {
        index: usize,
        location: ErrorLocation,
    },

    #[error("Wire Cyclic Reference: {index} {location}")]
    CyclicReference {
        index: usize,
        location: ErrorLocation,
    },

    #[error("Wire Base64 Error: {message} {location}")]
    Base64 {
        message: String,
        location: ErrorLocation,
    },
}

impl From<serde_json::Error> for WireError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        WireError::Json {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<base64::DecodeError> for WireError {
    #[track_caller]
    fn from(error: base64::DecodeError) -> Self {
        WireError::Base64 {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
