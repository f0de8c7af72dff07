//! The tagged wire message union and its mapping to [`WireValue`].
//!
//! Every variant is selected by a required `type` discriminant field.
//! Decoding matches exhaustively; an unknown discriminant is a typed
//! error, never a silent fall-through.

use crate::error::wire::WireError;
use crate::wire::value::WireValue;

use common::ErrorLocation;


pub const TYPE_FIELD: &str = "type";

const TYPE_CALL: &str = "call";
const TYPE_RESPONSE: &str = "response";
const TYPE_EVENT: &str = "event";
const TYPE_LOG: &str = "log";
const TYPE_SHOW_LOGIN_WINDOW: &str = "show-login-window";
const TYPE_GET_LAST_CONTENT_ID: &str = "get-last-content-id";
const TYPE_READ_VOICE_MESSAGE: &str = "read-voice-message";

const STATUS_FULFILLED: &str = "fulfilled";
const STATUS_REJECTED: &str = "rejected";

/// Outcome of an asynchronously handled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Fulfilled,
    Rejected,
}

impl ResponseStatus {
    fn as_str(self) -> &'static str {
        match self {
            ResponseStatus::Fulfilled => STATUS_FULFILLED,
            ResponseStatus::Rejected => STATUS_REJECTED,
        }
    }
}

/// One protocol frame, client- or server-originated.
///
/// `id` correlates a request variant to exactly one later `Response`.
/// Ids are supplied by the caller; the server does not deduplicate
/// them, so uniqueness among a connection's outstanding requests is a
/// client contract.
#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    Call {
        id: String,
        api: String,
        cmd: String,
        args: Vec<WireValue>,
    },
    Response {
        id: String,
        status: ResponseStatus,
        value: WireValue,
    },
    Event {
        api: String,
        cmd: String,
        payload: WireValue,
    },
    Log {
        raw: WireValue,
    },
    ShowLoginWindow {
        id: String,
    },
    GetLastContentId {
        id: String,
    },
    ReadVoiceMessage {
        id: String,
        file: String,
    },
}

impl WireMessage {
    /// Lower the message into the value model for structural encoding.
    pub fn to_value(&self) -> WireValue {
        match self {
            WireMessage::Call { id, api, cmd, args } => WireValue::object([
                (TYPE_FIELD, WireValue::from(TYPE_CALL)),
                ("id", WireValue::from(id.clone())),
                ("api", WireValue::from(api.clone())),
                ("cmd", WireValue::from(cmd.clone())),
                ("args", WireValue::Array(args.clone())),
            ]),
            WireMessage::Response { id, status, value } => WireValue::object([
                (TYPE_FIELD, WireValue::from(TYPE_RESPONSE)),
                ("id", WireValue::from(id.clone())),
                ("status", WireValue::from(status.as_str())),
                ("value", value.clone()),
            ]),
            WireMessage::Event { api, cmd, payload } => WireValue::object([
                (TYPE_FIELD, WireValue::from(TYPE_EVENT)),
                ("api", WireValue::from(api.clone())),
                ("cmd", WireValue::from(cmd.clone())),
                ("payload", payload.clone()),
            ]),
            WireMessage::Log { raw } => WireValue::object([
                (TYPE_FIELD, WireValue::from(TYPE_LOG)),
                ("raw", raw.clone()),
            ]),
            WireMessage::ShowLoginWindow { id } => WireValue::object([
                (TYPE_FIELD, WireValue::from(TYPE_SHOW_LOGIN_WINDOW)),
                ("id", WireValue::from(id.clone())),
            ]),
            WireMessage::GetLastContentId { id } => WireValue::object([
                (TYPE_FIELD, WireValue::from(TYPE_GET_LAST_CONTENT_ID)),
                ("id", WireValue::from(id.clone())),
            ]),
            WireMessage::ReadVoiceMessage { id, file } => WireValue::object([
                (TYPE_FIELD, WireValue::from(TYPE_READ_VOICE_MESSAGE)),
                ("id", WireValue::from(id.clone())),
                ("file", WireValue::from(file.clone())),
            ]),
        }
    }

    /// Raise a decoded value back into a message.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownMessageType`] for unrecognized
    /// discriminants and [`WireError::MissingField`] /
    /// [`WireError::BadField`] for malformed variant bodies.
    #[track_caller]
    pub fn from_value(value: &WireValue) -> Result<Self, WireError> {
        let kind = required_str(value, TYPE_FIELD)?;

        match kind {
            TYPE_CALL => Ok(WireMessage::Call {
                id: required_str(value, "id")?.to_string(),
                api: required_str(value, "api")?.to_string(),
                cmd: required_str(value, "cmd")?.to_string(),
                args: required_array(value, "args")?,
            }),
            TYPE_RESPONSE => Ok(WireMessage::Response {
                id: required_str(value, "id")?.to_string(),
                status: parse_status(required_str(value, "status")?)?,
                value: value.get("value").cloned().unwrap_or(WireValue::Undefined),
            }),
            TYPE_EVENT => Ok(WireMessage::Event {
                api: required_str(value, "api")?.to_string(),
                cmd: required_str(value, "cmd")?.to_string(),
                payload: value
                    .get("payload")
                    .cloned()
                    .unwrap_or(WireValue::Undefined),
            }),
            TYPE_LOG => Ok(WireMessage::Log {
                raw: value.get("raw").cloned().unwrap_or(WireValue::Undefined),
            }),
            TYPE_SHOW_LOGIN_WINDOW => Ok(WireMessage::ShowLoginWindow {
                id: required_str(value, "id")?.to_string(),
            }),
            TYPE_GET_LAST_CONTENT_ID => Ok(WireMessage::GetLastContentId {
                id: required_str(value, "id")?.to_string(),
            }),
            TYPE_READ_VOICE_MESSAGE => Ok(WireMessage::ReadVoiceMessage {
                id: required_str(value, "id")?.to_string(),
                file: required_str(value, "file")?.to_string(),
            }),
            other => Err(WireError::UnknownMessageType {
                found: other.to_string(),
                location: ErrorLocation::caller(),
            }),
        }
    }
}

#[track_caller]
fn required_str<'a>(value: &'a WireValue, field: &'static str) -> Result<&'a str, WireError> {
    let field_value = value.get(field).ok_or(WireError::MissingField {
        field,
        location: ErrorLocation::caller(),
    })?;
    field_value.as_str().ok_or_else(|| WireError::BadField {
        field,
        reason: format!("expected string, got {field_value:?}"),
        location: ErrorLocation::caller(),
    })
}

#[track_caller]
fn required_array(value: &WireValue, field: &'static str) -> Result<Vec<WireValue>, WireError> {
    match value.get(field) {
        Some(WireValue::Array(items)) => Ok(items.clone()),
        Some(other) => Err(WireError::BadField {
            field,
            reason: format!("expected array, got {other:?}"),
            location: ErrorLocation::caller(),
        }),
        None => Err(WireError::MissingField {
            field,
            location: ErrorLocation::caller(),
        }),
    }
}

#[track_caller]
fn parse_status(raw: &str) -> Result<ResponseStatus, WireError> {
    match raw {
        STATUS_FULFILLED => Ok(ResponseStatus::Fulfilled),
        STATUS_REJECTED => Ok(ResponseStatus::Rejected),
        other => Err(WireError::BadField {
            field: "status",
            reason: format!("expected fulfilled/rejected, got {other}"),
            location: ErrorLocation::caller(),
        }),
    }
}
