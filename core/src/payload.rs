//! Request and response bodies as they travel through the transports.

use serde_json::Value;

/// Header flagging a binary body, set by servers and read by the fetch transport.
pub const RESPONSE_FORMAT_HEADER: &str = "X-Response-Format";

/// Value of [`RESPONSE_FORMAT_HEADER`] for binary bodies.
pub const BINARY_FORMAT: &str = "Uint8Array";

/// A body that is either structured JSON or a raw byte buffer.
///
/// Binary bodies are flagged on the wire with `X-Response-Format: Uint8Array`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A parsed JSON document.
    Json(Value),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Payload {
    /// The JSON value, if this is a JSON payload.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            Payload::Bytes(_) => None,
        }
    }

    /// The raw bytes, if this is a binary payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Json(_) => None,
            Payload::Bytes(b) => Some(b),
        }
    }

    /// Best-effort JSON rendering for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Payload::Json(v) => serde_json::to_string(v).unwrap_or_else(|_| "[stringify failed]".into()),
            Payload::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_binary_marker_matches_generated_client() {
        let template = include_str!("../templates/client.ts");
        let check = format!(
            "response.headers.get(\"{}\") === \"{}\"",
            RESPONSE_FORMAT_HEADER, BINARY_FORMAT
        );
        assert!(template.contains(&check));
    }

    #[test]
    fn test_accessors() {
        let json = Payload::from(json!({"a": 1}));
        assert_eq!(json.as_json(), Some(&json!({"a": 1})));
        assert!(json.as_bytes().is_none());

        let bytes = Payload::from(vec![1u8, 2]);
        assert_eq!(bytes.as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(bytes.describe(), "<2 bytes>");
    }
}
