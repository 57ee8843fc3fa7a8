//! Response splitting, decryption, and parsing.
//!
//! A reply moves through a fixed sequence: raw bytes, header/body split (done
//! by the transport), optional decryption, then format-specific parsing. The
//! decryption step runs only when the client encrypts requests AND the HTTP
//! status is 200 — error replies come back in the clear and their body is
//! kept exactly as received, apart from the outer parse.

use monexy::config::{CipherSuite, ContentType};
use monexy::error::ProtocolError;
use monexy::{codec, crypt, encoding};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ClientError;
use crate::transport::RawResponse;

/// Parsed response body, tagged with the wire format it was parsed from.
///
/// Both variants hold the same ordered-tree representation; the tag records
/// which codec produced it so callers can format it back faithfully.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DecodedBody {
    /// Parsed from the JSON wire format.
    Json(Value),
    /// Parsed from the XML wire format.
    Xml(Value),
}

impl DecodedBody {
    /// The parsed value, regardless of source format.
    #[must_use]
    pub fn value(&self) -> &Value {
        match self {
            Self::Json(value) | Self::Xml(value) => value,
        }
    }
}

/// One fully processed gateway reply.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// HTTP status code of the reply.
    pub status_code: u16,
    /// Response headers in arrival order, as `name: value` strings.
    pub headers: Vec<String>,
    /// Body bytes exactly as received, before any decryption.
    pub raw_body: Vec<u8>,
    /// Canonical body text: the received text, or the re-serialized document
    /// after decryption.
    pub body_text: String,
    /// Parsed body, when one was present.
    pub decoded: Option<DecodedBody>,
}

/// Processes a raw HTTP reply into a [`ResponseEnvelope`].
///
/// `encryption` is the client's cipher suite when request encryption is
/// enabled. Decryption applies only when it is set and the status is 200; the
/// encrypted `body` field inside the parsed reply is then base64-decoded,
/// decrypted with the key derived from `secret`, parsed in the same wire
/// format, and spliced back in place of the opaque blob.
///
/// # Errors
///
/// Returns [`ClientError::Protocol`] with a `MalformedResponse` when the body
/// is not valid UTF-8, does not parse in the configured format, or the
/// encrypted payload cannot be decoded.
pub fn process(
    raw: RawResponse,
    content_type: ContentType,
    encryption: Option<CipherSuite>,
    secret: &str,
) -> Result<ResponseEnvelope, ClientError> {
    if raw.body.is_empty() {
        trace!(status = raw.status_code, "empty reply body");
        return Ok(ResponseEnvelope {
            status_code: raw.status_code,
            headers: raw.headers,
            raw_body: raw.body,
            body_text: String::new(),
            decoded: None,
        });
    }

    let body_text = String::from_utf8(raw.body.clone())
        .map_err(|_| ProtocolError::malformed("response body is not valid UTF-8"))?;

    let (body_text, value) = match encryption {
        Some(suite) if raw.status_code == 200 => {
            decrypt_body(&body_text, content_type, suite, secret)?
        }
        _ => {
            let value = codec::deserialize(&body_text, content_type)?;
            (body_text, value)
        }
    };

    let decoded = match content_type {
        ContentType::Json => DecodedBody::Json(value),
        ContentType::Xml => DecodedBody::Xml(value),
    };
    Ok(ResponseEnvelope {
        status_code: raw.status_code,
        headers: raw.headers,
        raw_body: raw.body,
        body_text,
        decoded: Some(decoded),
    })
}

/// Decrypts the `body` field of a successful encrypted reply and splices the
/// parsed plaintext back into the outer tree.
fn decrypt_body(
    body_text: &str,
    content_type: ContentType,
    suite: CipherSuite,
    secret: &str,
) -> Result<(String, Value), ClientError> {
    let mut outer = codec::deserialize(body_text, content_type)?;
    let slot = outer
        .pointer_mut("/response/body")
        .ok_or_else(|| ProtocolError::malformed("encrypted reply has no response body field"))?;
    let blob = slot
        .as_str()
        .ok_or_else(|| ProtocolError::malformed("encrypted reply body is not a string"))?;

    let ciphertext = encoding::from_base64(blob)
        .map_err(|e| ProtocolError::malformed(format!("encrypted reply body: {e}")))?;
    let plaintext = crypt::decrypt(&ciphertext, suite, secret)?;
    let plaintext = String::from_utf8(plaintext)
        .map_err(|_| ProtocolError::malformed("decrypted body is not valid UTF-8"))?;
    debug!(bytes = plaintext.len(), "reply body decrypted");

    let inner = match content_type {
        ContentType::Json => serde_json::from_str(&plaintext)
            .map_err(|e| ProtocolError::malformed(format!("decrypted body is not JSON: {e}")))?,
        ContentType::Xml => {
            // The plaintext is a standalone <body> document; unwrap the root
            // so the spliced tree has the same shape as a cleartext reply.
            let mut document = codec::deserialize(&plaintext, ContentType::Xml)?;
            document
                .get_mut("body")
                .map(Value::take)
                .ok_or_else(|| ProtocolError::malformed("decrypted body has no <body> root"))?
        }
    };
    *slot = inner;

    let body_text = codec::serialize(&outer, content_type);
    Ok((body_text, outer))
}
