//! Bidirectional mapping between wire messages and the host's internal
//! inter-process event convention.
//!
//! Internal event names follow `ns-<api-base>[-register|-unregister]-<id>`
//! with the register/unregister suffix re-appended *after* the content
//! id. Internal request/response metadata travels as the first element
//! of a message's argument list; the payload body is the second.

use crate::wire::message::{ResponseStatus, WireMessage};
use crate::wire::value::WireValue;
use crate::window::ContentId;

pub const EVENT_PREFIX: &str = "ns-";
pub const REGISTER_SUFFIX: &str = "-register";
pub const UNREGISTER_SUFFIX: &str = "-unregister";

/// Marker prepended to bridge-originated callback ids so host-side
/// responses can be told apart from the host's own correlation ids.
pub const CALLBACK_ID_MARKER: &str = "_!_";

/// All channels the bridge cares about carry this prefix.
pub const IPC_CHANNEL_PREFIX: &str = "IPC_";
/// Per-window inbound channel prefix; the full name is `IPC_UP_<id>`.
pub const INBOUND_CHANNEL_PREFIX: &str = "IPC_UP_";

pub const META_TYPE: &str = "type";
pub const META_EVENT_NAME: &str = "eventName";
pub const META_CALLBACK_ID: &str = "callbackId";
pub const META_PROMISE_STATE: &str = "promiseState";
pub const META_TYPE_REQUEST: &str = "request";
pub const META_TYPE_RESPONSE: &str = "response";
pub const PROMISE_STATE_FULFILLED: &str = "full";
pub const BODY_CMD_NAME: &str = "cmdName";
pub const BODY_PAYLOAD: &str = "payload";

/// Name of a window's dedicated inbound channel.
pub fn inbound_channel(content_id: ContentId) -> String {
    format!("{INBOUND_CHANNEL_PREFIX}{content_id}")
}

/// Wire `api` → internal event name.
///
/// A `-register`/`-unregister` suffix is stripped from the api before
/// the content id is embedded and re-appended after it:
/// `myApi-register` + id 7 → `ns-myApi-7-register`.
pub fn encode_event_name(api: &str, content_id: ContentId) -> String {
    let (base, suffix) = split_api_suffix(api);
    format!("{EVENT_PREFIX}{base}-{content_id}{suffix}")
}

/// Internal event name → wire `api` base.
///
/// Extracts the substring between the `ns-` prefix and the last
/// `-<content_id>` occurrence. Returns `None` when the name does not
/// follow the convention for this window.
pub fn decode_event_name(event_name: &str, content_id: ContentId) -> Option<String> {
    let after_prefix = event_name.strip_prefix(EVENT_PREFIX)?;
    let id_suffix = format!("-{content_id}");
    let cut = after_prefix.rfind(&id_suffix)?;
    Some(after_prefix[..cut].to_string())
}

/// Split a wire api into its base and an optional registration suffix.
pub fn split_api_suffix(api: &str) -> (&str, &str) {
    if let Some(base) = api.strip_suffix(REGISTER_SUFFIX) {
        (base, REGISTER_SUFFIX)
    } else if let Some(base) = api.strip_suffix(UNREGISTER_SUFFIX) {
        (base, UNREGISTER_SUFFIX)
    } else {
        (api, "")
    }
}

/// The internal event name an outbound message targets, if any.
pub fn outbound_event_name(args: &[WireValue]) -> Option<&str> {
    args.first()?.get(META_EVENT_NAME)?.as_str()
}

/// Build the internal argument list for a wire `Call` dispatched into a
/// window's inbound channel: `[meta, [cmd, ...args]]` with a marked
/// callback id so the later response can be correlated.
pub fn synthesize_call(
    id: &str,
    api: &str,
    cmd: &str,
    args: &[WireValue],
    content_id: ContentId,
) -> Vec<WireValue> {
    let meta = WireValue::object([
        (META_TYPE, WireValue::from(META_TYPE_REQUEST)),
        (
            META_CALLBACK_ID,
            WireValue::from(format!("{CALLBACK_ID_MARKER}{id}")),
        ),
        (
            META_EVENT_NAME,
            WireValue::from(encode_event_name(api, content_id)),
        ),
    ]);
    let mut body = Vec::with_capacity(args.len() + 1);
    body.push(WireValue::from(cmd));
    body.extend(args.iter().cloned());
    vec![meta, WireValue::Array(body)]
}

/// Classify an intercepted outbound message into a wire variant.
///
/// Request-shaped metadata becomes an `Event` (command name nested in
/// the body) or the symmetric `Call` echo; response-shaped metadata
/// whose callback id carries the bridge marker becomes a `Response`;
/// anything else is surfaced as `Log` in inspector mode only.
/// Returns `None` for traffic the bridge does not re-expose.
pub fn classify_outbound(
    channel: &str,
    args: &[WireValue],
    content_id: ContentId,
    inspector: bool,
) -> Option<WireMessage> {
    if !channel.starts_with(IPC_CHANNEL_PREFIX) {
        return None;
    }

    if let Some(classified) = classify_request(args, content_id) {
        return Some(classified);
    }
    if let Some(classified) = classify_response(args) {
        return Some(classified);
    }
    if inspector {
        return Some(WireMessage::Log {
            raw: WireValue::Array(args.to_vec()),
        });
    }
    None
}

fn classify_request(args: &[WireValue], content_id: ContentId) -> Option<WireMessage> {
    let meta = args.first()?;
    if meta.get(META_TYPE)?.as_str()? != META_TYPE_REQUEST {
        return None;
    }
    let event_name = meta.get(META_EVENT_NAME)?.as_str()?;
    let api = decode_event_name(event_name, content_id)?;
    let body = args.get(1)?;

    if let Some(cmd) = body.index(0).and_then(|head| head.get(BODY_CMD_NAME)) {
        return Some(WireMessage::Event {
            api,
            cmd: cmd.as_str()?.to_string(),
            payload: body
                .index(0)?
                .get(BODY_PAYLOAD)
                .cloned()
                .unwrap_or(WireValue::Undefined),
        });
    }

    // Symmetric case: the host echoing a forwarded call outward.
    let cmd = body.index(0)?.as_str()?.to_string();
    let call_args = match body {
        WireValue::Array(items) => items[1..].to_vec(),
        _ => return None,
    };
    Some(WireMessage::Call {
        id: meta.get(META_CALLBACK_ID)?.as_str()?.to_string(),
        api,
        cmd,
        args: call_args,
    })
}

fn classify_response(args: &[WireValue]) -> Option<WireMessage> {
    let meta = args.first()?;
    if meta.get(META_TYPE)?.as_str()? != META_TYPE_RESPONSE {
        return None;
    }
    let callback_id = meta.get(META_CALLBACK_ID)?.as_str()?;
    let id = callback_id.strip_prefix(CALLBACK_ID_MARKER)?;

    let status = match meta.get(META_PROMISE_STATE).and_then(WireValue::as_str) {
        Some(PROMISE_STATE_FULFILLED) => ResponseStatus::Fulfilled,
        _ => ResponseStatus::Rejected,
    };
    Some(WireMessage::Response {
        id: id.to_string(),
        status,
        value: args.get(1).cloned().unwrap_or(WireValue::Undefined),
    })
}
