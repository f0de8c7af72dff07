// Unit tests for the event translator: name convention, call
// synthesis, and outbound classification.

use crate::translate::{
    CALLBACK_ID_MARKER, META_CALLBACK_ID, META_EVENT_NAME, META_PROMISE_STATE, META_TYPE,
    classify_outbound, decode_event_name, encode_event_name, inbound_channel, synthesize_call,
};
use crate::wire::message::{ResponseStatus, WireMessage};
use crate::wire::value::WireValue;

/// **VALUE**: Verifies the `ns-<api>[-suffix]-<id>` convention with
/// suffix stripping and re-attachment after the content id.
///
/// **WHY THIS MATTERS**: Register/unregister calls only reach the host
/// if the suffix lands after the id; getting this wrong breaks every
/// subscription api silently.
#[test]
fn given_register_suffix_when_encoded_then_suffix_follows_content_id() {
    assert_eq!(encode_event_name("myApi", 7), "ns-myApi-7");
    assert_eq!(encode_event_name("myApi-register", 7), "ns-myApi-7-register");
    assert_eq!(
        encode_event_name("myApi-unregister", 7),
        "ns-myApi-7-unregister"
    );
}

/// **VALUE**: Verifies `decode(encode("myApi-register", 7)) == "myApi"`.
///
/// **BUG THIS CATCHES**: Would catch a decoder cutting at the first
/// rather than last id occurrence, or failing on the trailing suffix.
#[test]
fn given_encoded_names_when_decoded_then_api_base_recovered() {
    assert_eq!(
        decode_event_name(&encode_event_name("myApi-register", 7), 7).as_deref(),
        Some("myApi")
    );
    assert_eq!(
        decode_event_name(&encode_event_name("myApi", 7), 7).as_deref(),
        Some("myApi")
    );
    assert_eq!(decode_event_name("no-prefix-7", 7), None);
    assert_eq!(decode_event_name("ns-api-9", 7), None);
}

/// **VALUE**: Verifies a wire `Call` synthesizes exactly one internal
/// event shaped `[meta, [cmd, ...args]]` with the marked callback id.
///
/// **WHY THIS MATTERS**: This is the call-forwarding contract:
/// `Call{id:"x", api:"foo", cmd:"bar", args:[1,2]}` must become one
/// `ns-foo-<id>` event carrying `["bar", 1, 2]`.
#[test]
fn given_call_when_synthesized_then_internal_event_matches_convention() {
    let args = [WireValue::from(1.0), WireValue::from(2.0)];
    let message = synthesize_call("x", "foo", "bar", &args, 3);

    assert_eq!(message.len(), 2, "meta plus body");
    let meta = &message[0];
    assert_eq!(meta.get(META_TYPE).and_then(WireValue::as_str), Some("request"));
    assert_eq!(
        meta.get(META_CALLBACK_ID).and_then(WireValue::as_str),
        Some("_!_x")
    );
    assert_eq!(
        meta.get(META_EVENT_NAME).and_then(WireValue::as_str),
        Some("ns-foo-3")
    );
    assert_eq!(
        message[1],
        WireValue::Array(vec![
            WireValue::from("bar"),
            WireValue::from(1.0),
            WireValue::from(2.0),
        ])
    );
}

fn request_meta(event_name: &str, callback_id: &str) -> WireValue {
    WireValue::object([
        (META_TYPE, WireValue::from("request")),
        (META_CALLBACK_ID, WireValue::from(callback_id)),
        (META_EVENT_NAME, WireValue::from(event_name)),
    ])
}

/// **VALUE**: Verifies an outbound message with a nested command name
/// classifies as an `Event`.
#[test]
fn given_cmd_name_in_body_when_classified_then_event() {
    let body = WireValue::Array(vec![WireValue::object([
        ("cmdName", WireValue::from("statusChanged")),
        ("payload", WireValue::from("online")),
    ])]);
    let args = [request_meta("ns-presenceApi-4", "h1"), body];

    let classified = classify_outbound("IPC_DOWN_4", &args, 4, false);
    assert_eq!(
        classified,
        Some(WireMessage::Event {
            api: "presenceApi".to_string(),
            cmd: "statusChanged".to_string(),
            payload: WireValue::from("online"),
        })
    );
}

/// **VALUE**: Verifies the symmetric case, the host echoing a
/// positional call outward, classifies as a `Call` with the callback
/// id passed through untouched.
#[test]
fn given_positional_body_when_classified_then_call_echo() {
    let body = WireValue::Array(vec![
        WireValue::from("fetch"),
        WireValue::from(42.0),
    ]);
    let args = [request_meta("ns-storeApi-4", "host-77"), body];

    let classified = classify_outbound("IPC_DOWN_4", &args, 4, false);
    assert_eq!(
        classified,
        Some(WireMessage::Call {
            id: "host-77".to_string(),
            api: "storeApi".to_string(),
            cmd: "fetch".to_string(),
            args: vec![WireValue::from(42.0)],
        })
    );
}

/// **VALUE**: Verifies response-shaped traffic with the bridge marker
/// classifies as a `Response` with the marker stripped, and the
/// promise state selects the status.
///
/// **WHY THIS MATTERS**: This is how a forwarded `Call` gets its
/// answer back; a broken marker check would orphan every request.
#[test]
fn given_marked_response_when_classified_then_id_stripped_and_status_mapped() {
    let fulfilled_meta = WireValue::object([
        (META_TYPE, WireValue::from("response")),
        (
            META_CALLBACK_ID,
            WireValue::from(format!("{CALLBACK_ID_MARKER}x")),
        ),
        (META_PROMISE_STATE, WireValue::from("full")),
    ]);
    let args = [fulfilled_meta, WireValue::from("result")];
    assert_eq!(
        classify_outbound("IPC_DOWN_4", &args, 4, false),
        Some(WireMessage::Response {
            id: "x".to_string(),
            status: ResponseStatus::Fulfilled,
            value: WireValue::from("result"),
        })
    );

    let rejected_meta = WireValue::object([
        (META_TYPE, WireValue::from("response")),
        (
            META_CALLBACK_ID,
            WireValue::from(format!("{CALLBACK_ID_MARKER}y")),
        ),
        (META_PROMISE_STATE, WireValue::from("error")),
    ]);
    let args = [rejected_meta, WireValue::from("reason")];
    assert_eq!(
        classify_outbound("IPC_DOWN_4", &args, 4, false),
        Some(WireMessage::Response {
            id: "y".to_string(),
            status: ResponseStatus::Rejected,
            value: WireValue::from("reason"),
        })
    );
}

/// **VALUE**: Verifies host-internal responses (no bridge marker) are
/// not misattributed to a wire caller.
#[test]
fn given_unmarked_response_when_classified_then_not_a_response() {
    let meta = WireValue::object([
        (META_TYPE, WireValue::from("response")),
        (META_CALLBACK_ID, WireValue::from("host-internal-5")),
        (META_PROMISE_STATE, WireValue::from("full")),
    ]);
    let args = [meta, WireValue::from("result")];

    assert_eq!(classify_outbound("IPC_DOWN_4", &args, 4, false), None);
    // Inspector mode surfaces it as a log instead.
    assert!(matches!(
        classify_outbound("IPC_DOWN_4", &args, 4, true),
        Some(WireMessage::Log { .. })
    ));
}

/// **VALUE**: Verifies channels outside the internal prefix are never
/// classified, inspector mode or not.
#[test]
fn given_non_ipc_channel_when_classified_then_ignored() {
    let args = [request_meta("ns-someApi-4", "h1")];
    assert_eq!(classify_outbound("other-channel", &args, 4, false), None);
    assert_eq!(classify_outbound("other-channel", &args, 4, true), None);
}

/// **VALUE**: Verifies the inbound channel naming for a window.
#[test]
fn given_content_id_when_inbound_channel_built_then_prefixed() {
    assert_eq!(inbound_channel(12), "IPC_UP_12");
}
