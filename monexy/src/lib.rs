//! Core types and codecs for the Monexy payment gateway API.
//!
//! This crate implements the protocol half of the client pipeline: it builds
//! the structured request envelope, signs or encrypts it according to the
//! client configuration, and serializes it to one of the two wire formats the
//! gateway speaks (JSON or XML). The HTTP half lives in the companion
//! `monexy-http` crate.
//!
//! # Modules
//!
//! - [`config`] — credentials, wire format, and cipher suite selection
//! - [`envelope`] — request envelope construction and sealing
//! - [`sign`] — deterministic request signing
//! - [`crypt`] — symmetric cipher engine with IV handling
//! - [`codec`] — JSON/XML serialization, including the array↔XML mapping
//! - [`encoding`] — base64 and hex helpers shared across the pipeline
//! - [`error`] — protocol-level error types

pub mod codec;
pub mod config;
pub mod crypt;
pub mod encoding;
pub mod envelope;
pub mod error;
pub mod sign;

pub use config::{CipherAlgorithm, CipherMode, CipherSuite, ContentType, Credentials, RequestMethod};
pub use envelope::{RequestEnvelope, RequestNumber};
pub use error::ProtocolError;
