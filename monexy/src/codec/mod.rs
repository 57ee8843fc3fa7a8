//! Dual-format wire codec.
//!
//! The envelope is carried either as compact JSON or as an indented XML
//! document; the format is fixed per client and applies symmetrically to
//! request and response. Operation-specific fields all live inside `body`, so
//! the codec round-trips any envelope without request-specific special-casing.

pub mod xml;

use serde_json::{Map, Value};

use crate::config::ContentType;
use crate::error::ProtocolError;

/// Serializes a wire value in the given format.
///
/// The value is expected to be a map whose top-level keys become XML root
/// elements in XML mode (in practice a single `request` or `response` key).
#[must_use]
pub fn serialize(value: &Value, content_type: ContentType) -> String {
    match content_type {
        ContentType::Json => value.to_string(),
        ContentType::Xml => xml::to_document(value),
    }
}

/// Deserializes a raw payload in the given format into a structured value.
///
/// In XML mode the result is keyed by root element name, mirroring the JSON
/// shape, so `{"response": {...}}` comes back from both formats.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedResponse`] if the payload is not valid
/// in the expected format.
pub fn deserialize(raw: &str, content_type: ContentType) -> Result<Value, ProtocolError> {
    match content_type {
        ContentType::Json => serde_json::from_str(raw)
            .map_err(|e| ProtocolError::malformed(format!("invalid JSON: {e}"))),
        ContentType::Xml => xml::from_document(raw),
    }
}

/// Serializes a bare request body for encryption: a compact JSON object, or
/// an indented XML document rooted at `<body>`.
#[must_use]
pub fn serialize_body(body: &Value, content_type: ContentType) -> String {
    match content_type {
        ContentType::Json => body.to_string(),
        ContentType::Xml => {
            let mut wrapped = Map::new();
            wrapped.insert("body".to_owned(), body.clone());
            xml::to_document(&Value::Object(wrapped))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_round_trip() {
        let value = json!({
            "request": {
                "apiName": "testAPI",
                "requestNumber": "123456789",
                "body": { "method": "balance" },
                "sign": "deadbeef"
            }
        });
        let raw = serialize(&value, ContentType::Json);
        assert_eq!(deserialize(&raw, ContentType::Json).unwrap(), value);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = deserialize("not json", ContentType::Json).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse(_)));
    }

    #[test]
    fn body_serialization_is_compact_json() {
        let body = json!({ "method": "balance" });
        assert_eq!(
            serialize_body(&body, ContentType::Json),
            r#"{"method":"balance"}"#
        );
    }

    #[test]
    fn body_serialization_wraps_xml_root() {
        let body = json!({ "method": "balance" });
        let doc = serialize_body(&body, ContentType::Xml);
        assert!(doc.contains("<body>"));
        assert!(doc.contains("<method>balance</method>"));
    }
}
