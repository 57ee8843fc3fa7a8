//! Error types for the HTTP transport layer.

use monexy::ProtocolError;

use crate::transport::Diagnostics;

/// Well-known numeric codes carried by [`ClientError::Transport`], so that
/// callers and log scrapers can branch on failure class without parsing the
/// message text.
pub mod transport_code {
    /// Could not resolve or connect to the endpoint.
    pub const CONNECT_FAILED: u32 = 7;
    /// The connect or read timed out.
    pub const TIMED_OUT: u32 = 28;
    /// TLS handshake or certificate failure.
    pub const TLS_FAILED: u32 = 35;
    /// The connection dropped mid-transfer or the body could not be read.
    pub const TRANSFER_FAILED: u32 = 56;
    /// The request could not be constructed at all.
    pub const BAD_REQUEST: u32 = 3;
}

/// Errors surfaced by a gateway call. None are recovered internally; a call
/// either yields a fully decoded [`crate::ResponseEnvelope`] or fails with
/// one of these.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The HTTP backend could not be initialized (TLS setup and similar).
    /// Fatal, raised before any network attempt.
    #[error("HTTP client support unavailable: {0}")]
    MissingTransportCapability(#[source] reqwest::Error),

    /// Network, TLS, or connection failure. Fatal to the call; no retry is
    /// attempted. Diagnostics captured up to the failure point remain
    /// attached for debugging.
    #[error("transport error #{code}: {message}")]
    Transport {
        /// Failure class, one of the [`transport_code`] constants.
        code: u32,
        /// Human-readable description from the HTTP backend.
        message: String,
        /// Transfer metadata recorded before the failure.
        diagnostics: Box<Diagnostics>,
    },

    /// Protocol-level failure: missing cipher capability or a response body
    /// that cannot be parsed in the expected format.
    #[error("{source}")]
    Protocol {
        /// The underlying protocol failure.
        #[source]
        source: ProtocolError,
        /// Transfer metadata, present when the failure happened after a
        /// completed round trip.
        diagnostics: Option<Box<Diagnostics>>,
    },
}

impl From<ProtocolError> for ClientError {
    fn from(source: ProtocolError) -> Self {
        Self::Protocol {
            source,
            diagnostics: None,
        }
    }
}

impl ClientError {
    /// Classifies a reqwest failure into a [`ClientError::Transport`].
    pub(crate) fn transport(error: &reqwest::Error, diagnostics: Diagnostics) -> Self {
        let code = if error.is_timeout() {
            transport_code::TIMED_OUT
        } else if error.is_connect() {
            if format!("{error:?}").contains("certificate") {
                transport_code::TLS_FAILED
            } else {
                transport_code::CONNECT_FAILED
            }
        } else if error.is_builder() || error.is_request() {
            transport_code::BAD_REQUEST
        } else {
            transport_code::TRANSFER_FAILED
        };
        Self::Transport {
            code,
            message: error.to_string(),
            diagnostics: Box::new(diagnostics),
        }
    }

    /// Attaches transfer metadata to a protocol failure raised after the
    /// round trip completed.
    pub(crate) fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        if let Self::Protocol {
            diagnostics: slot @ None,
            ..
        } = &mut self
        {
            *slot = Some(Box::new(diagnostics));
        }
        self
    }

    /// Transfer metadata recorded before the failure, when the call got as
    /// far as the network.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Transport { diagnostics, .. } => Some(diagnostics),
            Self::Protocol { diagnostics, .. } => diagnostics.as_deref(),
            Self::MissingTransportCapability(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_convert_without_diagnostics() {
        let err: ClientError = ProtocolError::malformed("bad").into();
        assert!(matches!(
            err,
            ClientError::Protocol {
                diagnostics: None,
                ..
            }
        ));
        assert!(err.diagnostics().is_none());
    }

    #[test]
    fn diagnostics_attach_to_protocol_failures() {
        let diagnostics = Diagnostics {
            elapsed: std::time::Duration::from_millis(12),
            request_bytes: 100,
            response_bytes: 8,
            request_headers: vec!["user-agent: monexy-rs/0.1.0".to_owned()],
            url: "https://www.monexy.ua/api/server".to_owned(),
            status_code: Some(200),
        };
        let err =
            ClientError::from(ProtocolError::malformed("bad")).with_diagnostics(diagnostics);
        let attached = err.diagnostics().unwrap();
        assert_eq!(attached.status_code, Some(200));
        assert_eq!(attached.response_bytes, 8);
    }
}
