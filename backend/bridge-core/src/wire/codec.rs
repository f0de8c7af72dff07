//! Structural deep-clone encoding of wire messages.
//!
//! A frame is the JSON serialization of a flat node table: every value
//! in the tree becomes one tagged node, and containers refer to their
//! children by table index (node 0 is the root). The indirection lets
//! the format carry things plain JSON cannot express: `undefined` as
//! a first-class node, binary buffers (base64 in the node payload),
//! and shared references. A table whose references loop back on
//! themselves is representable on the wire but has no tree
//! counterpart, so the decoder reports it as a cyclic-reference error
//! instead of recursing forever.

use crate::error::wire::WireError;
use crate::wire::message::WireMessage;
use crate::wire::value::WireValue;

use common::ErrorLocation;


use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// One entry of the flat node table.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "lowercase")]
enum WireNode {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Base64 payload.
    Bytes(String),
    /// Child node indices.
    Array(Vec<usize>),
    /// Key plus child node index per entry.
    Object(Vec<(String, usize)>),
}

/// Serialize a message into one text frame.
pub fn encode(message: &WireMessage) -> Result<String, WireError> {
    let mut nodes = Vec::new();
    flatten(&message.to_value(), &mut nodes);
    Ok(serde_json::to_string(&nodes)?)
}

/// Deserialize one text frame into a message.
///
/// # Errors
///
/// Returns [`WireError`] on malformed JSON, an empty node table,
/// dangling or cyclic node references, invalid base64, or an unknown
/// message discriminant. Callers drop the frame and keep the
/// connection open.
pub fn decode(frame: &str) -> Result<WireMessage, WireError> {
    let nodes: Vec<WireNode> = serde_json::from_str(frame)?;
    if nodes.is_empty() {
        return Err(WireError::EmptyEncoding {
            location: ErrorLocation::caller(),
        });
    }
    let mut in_progress = vec![false; nodes.len()];
    let root = rebuild(&nodes, 0, &mut in_progress)?;
    WireMessage::from_value(&root)
}

fn flatten(value: &WireValue, nodes: &mut Vec<WireNode>) -> usize {
    // Reserve the slot first so parents precede children in the table.
    let index = nodes.len();
    nodes.push(WireNode::Undefined);

    let node = match value {
        WireValue::Undefined => WireNode::Undefined,
        WireValue::Null => WireNode::Null,
        WireValue::Bool(b) => WireNode::Bool(*b),
        WireValue::Number(n) => WireNode::Number(*n),
        WireValue::String(s) => WireNode::String(s.clone()),
        WireValue::Bytes(bytes) => WireNode::Bytes(BASE64.encode(bytes)),
        WireValue::Array(items) => {
            let children = items.iter().map(|item| flatten(item, nodes)).collect();
            WireNode::Array(children)
        }
        WireValue::Object(pairs) => {
            let children = pairs
                .iter()
                .map(|(key, item)| (key.clone(), flatten(item, nodes)))
                .collect();
            WireNode::Object(children)
        }
    };

    nodes[index] = node;
    index
}

#[track_caller]
fn rebuild(
    nodes: &[WireNode],
    index: usize,
    in_progress: &mut [bool],
) -> Result<WireValue, WireError> {
    let node = nodes.get(index).ok_or(WireError::BadReference {
        index,
        location: ErrorLocation::caller(),
    })?;
    if in_progress[index] {
        return Err(WireError::CyclicReference {
            index,
            location: ErrorLocation::caller(),
        });
    }

    let value = match node {
        WireNode::Undefined => WireValue::Undefined,
        WireNode::Null => WireValue::Null,
        WireNode::Bool(b) => WireValue::Bool(*b),
        WireNode::Number(n) => WireValue::Number(*n),
        WireNode::String(s) => WireValue::String(s.clone()),
        WireNode::Bytes(encoded) => WireValue::Bytes(BASE64.decode(encoded)?),
        WireNode::Array(children) => {
            in_progress[index] = true;
            let mut items = Vec::with_capacity(children.len());
            for child in children {
                items.push(rebuild(nodes, *child, in_progress)?);
            }
            in_progress[index] = false;
            WireValue::Array(items)
        }
        WireNode::Object(children) => {
            in_progress[index] = true;
            let mut pairs = Vec::with_capacity(children.len());
            for (key, child) in children {
                pairs.push((key.clone(), rebuild(nodes, *child, in_progress)?));
            }
            in_progress[index] = false;
            WireValue::Object(pairs)
        }
    };

    Ok(value)
}
