//! Request signing for the Merit Aktiva API.
//!
//! Every request to the API carries three query parameters: the caller's API
//! id, a timestamp, and a signature proving the caller holds the shared API
//! key. This crate implements both sides of that contract: computing the
//! signature for an outgoing request, and verifying it on a receiving end
//! (used by test servers).
//!
//! # Overview
//!
//! The signature is
//!
//! ```text
//! Base64(HMAC-SHA256(ApiKey, ApiId + Timestamp + Body))
//! ```
//!
//! where `Timestamp` is formatted as `yyyyMMddHHmmss` in UTC and `Body` is the
//! exact byte sequence transmitted as the request body.
//!
//! # Usage
//!
//! ```rust
//! use aktiva_auth::{Credentials, Timestamp, sign};
//!
//! let credentials = Credentials::new("api-id", "api-key");
//! let timestamp = Timestamp::parse("20240115103000").unwrap();
//! let signature = sign(credentials.api_key(), credentials.api_id(), &timestamp, b"{}");
//! assert_eq!(signature.len(), 44);
//! ```
//!
//! # Modules
//!
//! - [`credentials`] - API credentials and credential provider trait
//! - [`error`] - Authentication error types
//! - [`signature`] - Signature computation and verification
//! - [`timestamp`] - The signed timestamp and its wire format

pub mod credentials;
pub mod error;
pub mod signature;
pub mod timestamp;

pub use credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
pub use error::AuthError;
pub use signature::{
    API_ID_PARAM, SIGNATURE_PARAM, TIMESTAMP_PARAM, VerifiedRequest, sign, string_to_sign, verify,
    verify_query,
};
pub use timestamp::Timestamp;
