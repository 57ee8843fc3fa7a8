//! Blocking HTTP transport and client for the Monexy payment gateway API.
//!
//! This crate carries sealed request envelopes (built by the `monexy` core
//! crate) over HTTP and reverses the process on the reply: header/body
//! splitting, status-dependent decryption, and format-specific parsing.
//! Every operation is one blocking round trip; there is no retry, pooling,
//! or batching, and each call opens and tears down its own transport.
//!
//! # Modules
//!
//! - [`client`] — the [`MonexyClient`] and its operation methods
//! - [`transport`] — HTTP execution and per-call diagnostics
//! - [`response`] — response splitting, decryption, and parsing
//! - [`error`] — call-level error types

pub mod client;
pub mod error;
pub mod response;
pub mod transport;

pub use client::{
    B2cTransfer, C2bPayer, CallResult, CardHistoryQuery, MonexyClient, Order, P2pTransfer,
    VoucherActivation,
};
pub use error::ClientError;
pub use response::{DecodedBody, ResponseEnvelope};
pub use transport::{DEFAULT_ENDPOINT, Diagnostics, RawResponse, TransportConfig};
