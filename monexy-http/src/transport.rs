//! Blocking HTTP execution against the gateway endpoint.
//!
//! One call means one round trip on a freshly built HTTP client that is torn
//! down afterwards; nothing is cached or pooled between calls. Headers and
//! body are always requested together, and transfer diagnostics are recorded
//! for observability — they never influence control flow.

use std::time::{Duration, Instant};

use monexy::{ContentType, RequestMethod};
use reqwest::blocking;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tracing::{debug, trace};
use url::Url;

use crate::error::ClientError;

/// Default production endpoint of the gateway.
pub const DEFAULT_ENDPOINT: &str = "https://www.monexy.ua/api/server";

/// Form field (POST) or query parameter (GET) carrying the serialized
/// request.
pub const REQUEST_FIELD: &str = "request";

/// Where and how requests are sent.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Gateway endpoint URL.
    pub endpoint: Url,
    /// HTTP method used to carry the serialized request.
    pub method: RequestMethod,
    /// Verify the server TLS certificate chain.
    pub verify_certificate: bool,
    /// Verify that the certificate matches the host name.
    pub verify_hostname: bool,
    /// Optional suffix appended to the user agent string.
    pub user_agent_suffix: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.parse().expect("default endpoint is valid"),
            method: RequestMethod::default(),
            verify_certificate: true,
            verify_hostname: true,
            user_agent_suffix: None,
        }
    }
}

/// Raw HTTP reply, before response processing.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers in arrival order, as `name: value` strings.
    pub headers: Vec<String>,
    /// Body bytes exactly as received.
    pub body: Vec<u8>,
}

/// Read-only transfer metadata for one call.
///
/// Recorded on every call, success or failure, and exposed for debugging
/// only — nothing in the pipeline branches on it.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    /// Wall-clock duration of the round trip.
    pub elapsed: Duration,
    /// Size of the serialized request payload in bytes.
    pub request_bytes: usize,
    /// Size of the response body in bytes, when one was received.
    pub response_bytes: usize,
    /// Effective request headers as sent.
    pub request_headers: Vec<String>,
    /// Final URL the request went to.
    pub url: String,
    /// HTTP status code, when a response line was received.
    pub status_code: Option<u16>,
}

/// Executes one blocking round trip carrying `request_string`.
///
/// POST submits the payload under the [`REQUEST_FIELD`] form field; GET
/// URL-escapes it into the query string. The `Content-Type` header always
/// reflects the configured wire format.
///
/// # Errors
///
/// Returns [`ClientError::MissingTransportCapability`] if the HTTP backend
/// cannot be initialized, and [`ClientError::Transport`] for network, TLS,
/// or timeout failures — with diagnostics attached.
pub fn send(
    config: &TransportConfig,
    content_type: ContentType,
    request_string: &str,
) -> Result<(RawResponse, Diagnostics), ClientError> {
    let client = blocking::Client::builder()
        .danger_accept_invalid_certs(!config.verify_certificate)
        .danger_accept_invalid_hostnames(!config.verify_hostname)
        .build()
        .map_err(ClientError::MissingTransportCapability)?;

    let builder = match config.method {
        RequestMethod::Post => client
            .post(config.endpoint.clone())
            .form(&[(REQUEST_FIELD, request_string)]),
        RequestMethod::Get => client
            .get(config.endpoint.clone())
            .query(&[(REQUEST_FIELD, request_string)]),
    };
    let request = builder
        .header(USER_AGENT, user_agent(config, content_type))
        .header(CONTENT_TYPE, content_type.header_value())
        .build()
        .map_err(|e| {
            ClientError::transport(&e, blank_diagnostics(config, request_string.len()))
        })?;

    let request_headers = header_lines(request.headers());
    let url = request.url().to_string();
    debug!(%url, method = %config.method, bytes = request_string.len(), "sending request");

    let started = Instant::now();
    let response = match client.execute(request) {
        Ok(response) => response,
        Err(e) => {
            let diagnostics = Diagnostics {
                elapsed: started.elapsed(),
                request_bytes: request_string.len(),
                response_bytes: 0,
                request_headers,
                url,
                status_code: e.status().map(|s| s.as_u16()),
            };
            return Err(ClientError::transport(&e, diagnostics));
        }
    };

    let status_code = response.status().as_u16();
    let headers = header_lines(response.headers());
    let body = match response.bytes() {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            let diagnostics = Diagnostics {
                elapsed: started.elapsed(),
                request_bytes: request_string.len(),
                response_bytes: 0,
                request_headers,
                url,
                status_code: Some(status_code),
            };
            return Err(ClientError::transport(&e, diagnostics));
        }
    };

    let diagnostics = Diagnostics {
        elapsed: started.elapsed(),
        request_bytes: request_string.len(),
        response_bytes: body.len(),
        request_headers,
        url,
        status_code: Some(status_code),
    };
    trace!(
        status = status_code,
        bytes = body.len(),
        elapsed_ms = diagnostics.elapsed.as_millis() as u64,
        "received reply"
    );

    Ok((
        RawResponse {
            status_code,
            headers,
            body,
        },
        diagnostics,
    ))
}

fn blank_diagnostics(config: &TransportConfig, request_bytes: usize) -> Diagnostics {
    Diagnostics {
        elapsed: Duration::ZERO,
        request_bytes,
        response_bytes: 0,
        request_headers: Vec::new(),
        url: config.endpoint.to_string(),
        status_code: None,
    }
}

fn user_agent(config: &TransportConfig, content_type: ContentType) -> String {
    let mut agent = format!(
        "monexy-rs/{} ({}/{})",
        env!("CARGO_PKG_VERSION"),
        config.method,
        content_type
    );
    if let Some(suffix) = &config.user_agent_suffix {
        agent.push(' ');
        agent.push_str(suffix);
    }
    agent
}

fn header_lines(headers: &reqwest::header::HeaderMap) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| format!("{name}: {}", value.to_str().unwrap_or("<binary>")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_verifies_tls() {
        let config = TransportConfig::default();
        assert!(config.verify_certificate);
        assert!(config.verify_hostname);
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn user_agent_names_method_and_format() {
        let config = TransportConfig::default();
        let agent = user_agent(&config, ContentType::Json);
        assert!(agent.contains("(POST/JSON)"));
    }

    #[test]
    fn user_agent_suffix_is_appended() {
        let config = TransportConfig {
            user_agent_suffix: Some("shop/2.0".to_owned()),
            ..TransportConfig::default()
        };
        assert!(user_agent(&config, ContentType::Xml).ends_with("shop/2.0"));
    }
}
