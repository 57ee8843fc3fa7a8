//! Client configuration types.
//!
//! The configuration surface recognized by the gateway client: API identity,
//! wire format, HTTP method, and the cipher suite used when request
//! encryption is enabled. All of these are fixed per client instance; the
//! gateway performs no negotiation.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// API identity supplied at configuration time. Immutable per client.
///
/// Deserializes from the recognized option map, where the fields are spelled
/// `apiName` and `sharedSecret`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// The API name registered with the gateway.
    pub api_name: String,
    /// The shared secret for that API name. Never transmitted; used for
    /// signing and key derivation only.
    #[serde(rename = "sharedSecret")]
    pub api_password: String,
}

impl Credentials {
    /// Creates credentials from an API name and its shared secret.
    #[must_use]
    pub fn new(api_name: impl Into<String>, api_password: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            api_password: api_password.into(),
        }
    }
}

/// Wire serialization format, chosen once per client and applied
/// symmetrically to request and response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    /// JSON envelope, compact on the wire.
    #[default]
    Json,
    /// XML envelope, pretty-printed before transmission.
    Xml,
}

impl ContentType {
    /// The `Content-Type` header value for this format.
    #[must_use]
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// The configuration-surface spelling of this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xml => "XML",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP method used to carry the serialized request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// Request submitted in one URL-encoded form field.
    #[default]
    Post,
    /// Request URL-escaped into a query parameter.
    Get,
}

impl RequestMethod {
    /// The HTTP verb for this method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
        }
    }
}

impl Display for RequestMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symmetric cipher algorithm. The choice is a static, pre-agreed contract
/// with the gateway; picking one the server does not expect simply yields
/// undecryptable traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherAlgorithm {
    /// Blowfish, 8-byte blocks. The gateway default.
    #[default]
    Blowfish,
    /// Rijndael with 16-byte blocks; with the 32-byte derived key this is
    /// AES-256.
    #[serde(rename = "rijndael-128")]
    Rijndael128,
}

impl CipherAlgorithm {
    /// Cipher block size in bytes.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Blowfish => 8,
            Self::Rijndael128 => 16,
        }
    }

    /// Human-readable name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blowfish => "blowfish",
            Self::Rijndael128 => "rijndael-128",
        }
    }
}

impl Display for CipherAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block cipher mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherMode {
    /// Cipher block chaining; a fresh random IV is generated per encryption
    /// and prepended to the ciphertext.
    #[default]
    Cbc,
    /// Electronic codebook; the mode ignores the IV's content, but a
    /// block-size IV still travels at the front of the blob.
    Ecb,
}

impl CipherMode {
    /// Human-readable name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cbc => "cbc",
            Self::Ecb => "ecb",
        }
    }
}

impl Display for CipherMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Algorithm/mode pair used when request encryption is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CipherSuite {
    /// The block cipher.
    pub algorithm: CipherAlgorithm,
    /// Its mode of operation.
    pub mode: CipherMode,
}

impl CipherSuite {
    /// Creates a suite from an explicit algorithm/mode pair.
    #[must_use]
    pub const fn new(algorithm: CipherAlgorithm, mode: CipherMode) -> Self {
        Self { algorithm, mode }
    }

    /// Length of the IV prepended to the ciphertext: the cipher block size
    /// in both modes. mcrypt reports a block-size IV even for ECB, and the
    /// server prepends and strips it unconditionally, so the prefix must
    /// travel even where the mode ignores it.
    #[must_use]
    pub const fn iv_len(self) -> usize {
        self.algorithm.block_size()
    }
}

impl Display for CipherSuite {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.algorithm, self.mode)
    }
}
