//! Base64 and hex helpers for the wire format.

use std::fmt::Write as _;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;

/// Encodes raw bytes to a standard-alphabet base64 string.
#[must_use]
pub fn to_base64<T: AsRef<[u8]>>(input: T) -> String {
    b64.encode(input.as_ref())
}

/// Decodes a standard-alphabet base64 string to raw bytes.
///
/// # Errors
///
/// Returns an error if the input is not valid base64.
pub fn from_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    b64.decode(input)
}

/// Renders bytes as lowercase hex. Used for digest output: both the request
/// signature and the derived cipher key are hex renderings of a digest.
#[must_use]
pub fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip() {
        let data = b"\x00\x01\xfe\xffpayload";
        assert_eq!(from_base64(&to_base64(data)).unwrap(), data);
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(hex_lower(&[0x00, 0x0f, 0xab]), "000fab");
    }
}
