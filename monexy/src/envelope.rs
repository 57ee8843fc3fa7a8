//! Request envelope construction and sealing.

use std::fmt::{self, Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

use crate::codec;
use crate::config::{CipherSuite, ContentType, Credentials};
use crate::crypt;
use crate::encoding;
use crate::error::ProtocolError;
use crate::sign;

/// Nonce-like request identifier derived from the current time.
///
/// Unix seconds concatenated with the first five sub-second digits, rendered
/// as one numeric string. Unique within a process at call granularity; two
/// calls inside the same 10µs window can collide. That resolution matches
/// what the server tolerates and is deliberately not strengthened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestNumber(String);

impl RequestNumber {
    /// Generates a request number from the current system time.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(format!("{}{:05}", now.as_secs(), now.subsec_micros() / 10))
    }

    /// Wraps a fixed request number, mainly for deterministic tests.
    #[must_use]
    pub fn fixed(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// The numeric string carried on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RequestNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The outer structured request object: identity, request number, body, and
/// at most one of a signature or an encrypted body.
///
/// Exactly one protection is applied per envelope: when encryption is
/// disabled the envelope carries a `sign` field; when enabled, `body` becomes
/// an opaque base64 blob and no signature is added. Envelopes are created
/// fresh per call and never reused.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    /// The API name the gateway authenticates.
    pub api_name: String,
    /// Per-call request number.
    pub request_number: RequestNumber,
    /// Operation body, or a base64 string once encrypted.
    pub body: Value,
    /// Request signature; present iff encryption is disabled.
    pub sign: Option<String>,
}

impl RequestEnvelope {
    /// Builds and seals the envelope for one call.
    ///
    /// With `encryption` set, the body is serialized in the configured
    /// format, encrypted, and replaced by its base64 blob; otherwise the
    /// envelope is signed over `apiName:requestNumber:secret`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingCryptoCapability`] if encryption was
    /// requested and the cipher backend refuses to initialize.
    pub fn seal(
        credentials: &Credentials,
        request_number: RequestNumber,
        body: Value,
        content_type: ContentType,
        encryption: Option<CipherSuite>,
    ) -> Result<Self, ProtocolError> {
        match encryption {
            Some(suite) => {
                let plaintext = codec::serialize_body(&body, content_type);
                let blob = crypt::encrypt(plaintext.as_bytes(), suite, &credentials.api_password)?;
                Ok(Self {
                    api_name: credentials.api_name.clone(),
                    request_number,
                    body: Value::String(encoding::to_base64(blob)),
                    sign: None,
                })
            }
            None => {
                let signature = sign::sign(
                    &credentials.api_name,
                    request_number.as_str(),
                    &credentials.api_password,
                );
                Ok(Self {
                    api_name: credentials.api_name.clone(),
                    request_number,
                    body,
                    sign: Some(signature),
                })
            }
        }
    }

    /// The wire value, wrapped under the top-level `request` key. Field
    /// order is fixed; it is observable in the XML rendering.
    #[must_use]
    pub fn to_wire_value(&self) -> Value {
        let mut inner = Map::new();
        inner.insert("apiName".to_owned(), Value::String(self.api_name.clone()));
        inner.insert(
            "requestNumber".to_owned(),
            Value::String(self.request_number.to_string()),
        );
        inner.insert("body".to_owned(), self.body.clone());
        if let Some(signature) = &self.sign {
            inner.insert("sign".to_owned(), Value::String(signature.clone()));
        }
        let mut outer = Map::new();
        outer.insert("request".to_owned(), Value::Object(inner));
        Value::Object(outer)
    }

    /// Serializes the envelope in the configured wire format.
    #[must_use]
    pub fn to_wire_string(&self, content_type: ContentType) -> String {
        codec::serialize(&self.to_wire_value(), content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypt;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials::new("testAPI", "password")
    }

    #[test]
    fn request_numbers_are_numeric_strings() {
        let number = RequestNumber::now();
        assert!(number.as_str().len() >= 6);
        assert!(number.as_str().bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn signed_envelope_has_sign_and_plain_body() {
        let envelope = RequestEnvelope::seal(
            &credentials(),
            RequestNumber::fixed("123456789"),
            json!({ "method": "balance" }),
            ContentType::Json,
            None,
        )
        .unwrap();
        assert_eq!(
            envelope.sign.as_deref(),
            Some("a1caff2cd471f5800b35a3459ba50f06cb840958")
        );
        assert_eq!(envelope.body, json!({ "method": "balance" }));
    }

    #[test]
    fn encrypted_envelope_has_base64_body_and_no_sign() {
        let suite = CipherSuite::default();
        let envelope = RequestEnvelope::seal(
            &credentials(),
            RequestNumber::fixed("123456789"),
            json!({ "method": "balance" }),
            ContentType::Json,
            Some(suite),
        )
        .unwrap();
        assert!(envelope.sign.is_none());
        let blob = envelope.body.as_str().expect("body must be a string");
        let decrypted =
            crypt::decrypt(&crate::encoding::from_base64(blob).unwrap(), suite, "password")
                .unwrap();
        assert_eq!(decrypted, br#"{"method":"balance"}"#);
    }

    #[test]
    fn wire_value_shape_when_signed() {
        let envelope = RequestEnvelope::seal(
            &credentials(),
            RequestNumber::fixed("42"),
            json!({ "method": "balance" }),
            ContentType::Json,
            None,
        )
        .unwrap();
        let wire = envelope.to_wire_value();
        assert_eq!(wire["request"]["apiName"], json!("testAPI"));
        assert_eq!(wire["request"]["requestNumber"], json!("42"));
        assert!(wire["request"]["sign"].is_string());
    }

    #[test]
    fn wire_value_omits_sign_when_encrypted() {
        let envelope = RequestEnvelope::seal(
            &credentials(),
            RequestNumber::fixed("42"),
            json!({ "method": "balance" }),
            ContentType::Json,
            Some(CipherSuite::default()),
        )
        .unwrap();
        let wire = envelope.to_wire_value();
        assert!(wire["request"].get("sign").is_none());
        assert!(wire["request"]["body"].is_string());
    }

    #[test]
    fn encrypted_xml_body_is_an_xml_document() {
        let suite = CipherSuite::default();
        let envelope = RequestEnvelope::seal(
            &credentials(),
            RequestNumber::fixed("7"),
            json!({ "method": "balance" }),
            ContentType::Xml,
            Some(suite),
        )
        .unwrap();
        let blob = envelope.body.as_str().unwrap();
        let plaintext =
            crypt::decrypt(&crate::encoding::from_base64(blob).unwrap(), suite, "password")
                .unwrap();
        let text = String::from_utf8(plaintext).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<method>balance</method>"));
    }
}
