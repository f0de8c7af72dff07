//! The value model carried inside wire messages.
//!
//! The bridge transports opaque call/arg/return payloads without
//! interpreting them, so the model has to cover everything the host's
//! internal traffic can contain: `undefined` distinct from `null`,
//! raw binary buffers, and arbitrary nesting. Objects preserve key
//! order so classification and re-encoding round-trip byte-stably.

/// One transported value.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<WireValue>),
    /// Order-preserving key/value pairs.
    Object(Vec<(String, WireValue)>),
}

impl WireValue {
    /// Build an object from `(key, value)` pairs.
    pub fn object<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, WireValue)>,
        K: Into<String>,
    {
        WireValue::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a field on an object value.
    pub fn get(&self, key: &str) -> Option<&WireValue> {
        match self {
            WireValue::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Index into an array value.
    pub fn index(&self, position: usize) -> Option<&WireValue> {
        match self {
            WireValue::Array(items) => items.get(position),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            WireValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WireValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, WireValue::Undefined)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        WireValue::String(value.to_string())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        WireValue::String(value)
    }
}

impl From<f64> for WireValue {
    fn from(value: f64) -> Self {
        WireValue::Number(value)
    }
}

impl From<u32> for WireValue {
    fn from(value: u32) -> Self {
        WireValue::Number(f64::from(value))
    }
}

impl From<i32> for WireValue {
    fn from(value: i32) -> Self {
        WireValue::Number(f64::from(value))
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        WireValue::Bool(value)
    }
}

impl From<Vec<u8>> for WireValue {
    fn from(value: Vec<u8>) -> Self {
        WireValue::Bytes(value)
    }
}
