//! Protocol-level error types.
//!
//! Failures here are never recovered internally; a call either yields a fully
//! decoded response or surfaces one of these to the caller.

/// Errors produced by the protocol core: envelope sealing, the cipher engine,
/// and the wire codecs.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// Encryption or decryption was requested but the cipher backend refused
    /// to initialize for the configured algorithm/mode pair. Fatal, raised
    /// before any network activity.
    #[error("cipher support unavailable: {0}")]
    MissingCryptoCapability(String),

    /// A payload could not be handled in the expected wire format: invalid
    /// XML or JSON where the configuration demands it, bad base64, or a
    /// ciphertext that does not line up with the cipher block size.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProtocolError {
    /// Shorthand for a [`ProtocolError::MalformedResponse`] with context.
    pub fn malformed(context: impl Into<String>) -> Self {
        Self::MalformedResponse(context.into())
    }
}
