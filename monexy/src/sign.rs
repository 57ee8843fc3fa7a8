//! Deterministic request signing.
//!
//! Signing applies only when request encryption is disabled; an encrypted
//! envelope is never additionally signed. The server's verification logic is
//! a fixed contract, so the concatenation order and separator below must not
//! change.

use sha1::{Digest, Sha1};

use crate::encoding::hex_lower;

/// Computes the request signature: the lowercase hex SHA-1 digest of
/// `"{api_name}:{request_number}:{secret}"`.
///
/// Pure and deterministic; the same inputs always yield the same signature.
#[must_use]
pub fn sign(api_name: &str, request_number: &str, secret: &str) -> String {
    let digest = Sha1::digest(format!("{api_name}:{request_number}:{secret}"));
    hex_lower(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        assert_eq!(
            sign("testAPI", "123456789", "password"),
            "a1caff2cd471f5800b35a3459ba50f06cb840958"
        );
    }

    #[test]
    fn deterministic() {
        let a = sign("api", "42", "s3cret");
        let b = sign("api", "42", "s3cret");
        assert_eq!(a, b);
    }

    #[test]
    fn sensitive_to_every_field() {
        let base = sign("api", "42", "secret");
        assert_ne!(base, sign("api2", "42", "secret"));
        assert_ne!(base, sign("api", "43", "secret"));
        assert_ne!(base, sign("api", "42", "secret2"));
    }
}
