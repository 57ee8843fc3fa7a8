//! The gateway client and its call pipeline.
//!
//! [`MonexyClient`] is configured once and then immutable; every call runs
//! the same pipeline — request number, envelope sealing (signature or
//! encryption, never both), wire serialization, one blocking round trip, and
//! response processing. All per-call state lives in the returned
//! [`CallResult`], so a client can be shared or cloned freely and the caller
//! owns any concurrency.

mod ops;

pub use ops::{B2cTransfer, C2bPayer, CardHistoryQuery, Order, P2pTransfer, VoucherActivation};

use monexy::config::{CipherSuite, ContentType, Credentials, RequestMethod};
use monexy::envelope::{RequestEnvelope, RequestNumber};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ClientError;
use crate::response::{self, ResponseEnvelope};
use crate::transport::{self, Diagnostics, TransportConfig};

/// Everything produced by one call: the serialized request as sent, the
/// processed reply, and the transfer diagnostics.
#[derive(Debug, Clone)]
pub struct CallResult {
    /// The request exactly as serialized onto the wire.
    pub request: String,
    /// The processed reply.
    pub response: ResponseEnvelope,
    /// Transfer metadata for this call.
    pub diagnostics: Diagnostics,
}

/// Blocking client for the Monexy gateway API.
///
/// Built from [`Credentials`] plus optional overrides; defaults are JSON over
/// POST against the production endpoint, signed requests, full TLS
/// verification.
#[derive(Debug, Clone)]
pub struct MonexyClient {
    credentials: Credentials,
    content_type: ContentType,
    encryption: Option<CipherSuite>,
    transport: TransportConfig,
}

impl MonexyClient {
    /// Creates a client with default settings for the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            content_type: ContentType::default(),
            encryption: None,
            transport: TransportConfig::default(),
        }
    }

    /// Sets the wire format (JSON or XML), applied to request and response.
    #[must_use]
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Sets the HTTP method carrying the serialized request.
    #[must_use]
    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.transport.method = method;
        self
    }

    /// Enables request encryption with the given cipher suite. Encrypted
    /// envelopes carry no signature.
    #[must_use]
    pub fn with_encryption(mut self, suite: CipherSuite) -> Self {
        self.encryption = Some(suite);
        self
    }

    /// Overrides the gateway endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.transport.endpoint = endpoint;
        self
    }

    /// Toggles TLS certificate chain verification.
    #[must_use]
    pub fn with_certificate_verification(mut self, verify: bool) -> Self {
        self.transport.verify_certificate = verify;
        self
    }

    /// Toggles TLS hostname verification.
    #[must_use]
    pub fn with_hostname_verification(mut self, verify: bool) -> Self {
        self.transport.verify_hostname = verify;
        self
    }

    /// Appends a caller identifier to the user agent string.
    #[must_use]
    pub fn with_user_agent_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.transport.user_agent_suffix = Some(suffix.into());
        self
    }

    /// The configured wire format.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Whether request encryption is enabled, and with which suite.
    #[must_use]
    pub fn encryption(&self) -> Option<CipherSuite> {
        self.encryption
    }

    /// Executes one call with a freshly generated request number.
    ///
    /// `body` is the operation body; the envelope fields around it are filled
    /// in from the client configuration.
    ///
    /// # Errors
    ///
    /// Any of the [`ClientError`] kinds: cipher or HTTP backend unavailable,
    /// transport failure, or an unparseable reply.
    pub fn call(&self, body: Value) -> Result<CallResult, ClientError> {
        self.call_numbered(RequestNumber::now(), body)
    }

    /// Executes one call with an explicit request number.
    ///
    /// Exists mainly so tests can pin the number and assert on the resulting
    /// signature; production callers normally use [`MonexyClient::call`].
    ///
    /// # Errors
    ///
    /// Same as [`MonexyClient::call`].
    pub fn call_numbered(
        &self,
        request_number: RequestNumber,
        body: Value,
    ) -> Result<CallResult, ClientError> {
        let envelope = RequestEnvelope::seal(
            &self.credentials,
            request_number,
            body,
            self.content_type,
            self.encryption,
        )?;
        let request = envelope.to_wire_string(self.content_type);
        debug!(
            api_name = %envelope.api_name,
            request_number = %envelope.request_number,
            encrypted = self.encryption.is_some(),
            "envelope sealed"
        );

        let (raw, diagnostics) = transport::send(&self.transport, self.content_type, &request)?;
        let response = match response::process(
            raw,
            self.content_type,
            self.encryption,
            &self.credentials.api_password,
        ) {
            Ok(response) => response,
            // The round trip completed; keep its diagnostics inspectable.
            Err(e) => return Err(e.with_diagnostics(diagnostics)),
        };
        Ok(CallResult {
            request,
            response,
            diagnostics,
        })
    }
}
