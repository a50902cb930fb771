//! Signature computation and verification.
//!
//! ```text
//! StringToSign = ApiId + Timestamp + Body
//! Signature    = Base64(HMAC-SHA256(ApiKey, StringToSign))
//! ```
//!
//! `Body` is the serialized request body exactly as it is transmitted. The
//! body must be serialized once, signed, and then sent unchanged; any
//! re-serialization invalidates the signature on the server.
//!
//! The main entry points are [`sign`] for outgoing requests and
//! [`verify_query`] for the receiving side.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::credentials::CredentialProvider;
use crate::error::AuthError;
use crate::timestamp::Timestamp;

/// Query parameter carrying the API id.
pub const API_ID_PARAM: &str = "ApiId";

/// Query parameter carrying the request timestamp.
pub const TIMESTAMP_PARAM: &str = "timestamp";

/// Query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";

type HmacSha256 = Hmac<Sha256>;

/// The result of a successful signature verification.
#[derive(Debug, Clone)]
pub struct VerifiedRequest {
    /// The API id that signed the request.
    pub api_id: String,
    /// The timestamp the request was signed with.
    pub timestamp: Timestamp,
}

/// Build the exact byte string that is signed.
///
/// # Examples
///
/// ```
/// use aktiva_auth::{Timestamp, string_to_sign};
///
/// let ts = Timestamp::parse("20240115103000").unwrap();
/// assert_eq!(string_to_sign("id", &ts, b"{}"), b"id20240115103000{}");
/// ```
#[must_use]
pub fn string_to_sign(api_id: &str, timestamp: &Timestamp, body: &[u8]) -> Vec<u8> {
    let timestamp = timestamp.to_string();
    let mut data = Vec::with_capacity(api_id.len() + timestamp.len() + body.len());
    data.extend_from_slice(api_id.as_bytes());
    data.extend_from_slice(timestamp.as_bytes());
    data.extend_from_slice(body);
    data
}

/// Compute the base64-encoded HMAC-SHA256 signature for a request.
#[must_use]
pub fn sign(api_key: &[u8], api_id: &str, timestamp: &Timestamp, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(api_key).expect("HMAC can accept keys of any length");
    mac.update(&string_to_sign(api_id, timestamp, body));
    BASE64.encode(mac.finalize().into_bytes())
}

/// Verify a provided signature against the expected one.
///
/// The comparison is constant-time.
///
/// # Errors
///
/// Returns [`AuthError::SignatureDoesNotMatch`] if the signatures differ.
pub fn verify(
    api_key: &[u8],
    api_id: &str,
    timestamp: &Timestamp,
    body: &[u8],
    provided: &str,
) -> Result<(), AuthError> {
    let expected = sign(api_key, api_id, timestamp, body);

    if provided.as_bytes().ct_eq(expected.as_bytes()).into() {
        Ok(())
    } else {
        debug!(
            api_id,
            %timestamp,
            expected = %expected,
            provided = %provided,
            "Signature mismatch"
        );
        Err(AuthError::SignatureDoesNotMatch)
    }
}

/// Verify a signed request from its raw query string and body.
///
/// Extracts `ApiId`, `timestamp` and `signature` from the query, resolves the
/// API key through the credential provider, and checks the signature.
///
/// # Errors
///
/// Returns an [`AuthError`] if:
/// - One of the authentication parameters is missing
/// - The timestamp is malformed
/// - The API id is unknown
/// - The signature does not match
pub fn verify_query(
    query: &str,
    body: &[u8],
    credential_provider: &dyn CredentialProvider,
) -> Result<VerifiedRequest, AuthError> {
    let mut api_id = None;
    let mut timestamp = None;
    let mut signature = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            API_ID_PARAM => api_id = Some(value.into_owned()),
            TIMESTAMP_PARAM => timestamp = Some(value.into_owned()),
            SIGNATURE_PARAM => signature = Some(value.into_owned()),
            _ => {}
        }
    }

    let api_id = api_id.ok_or_else(|| AuthError::MissingQueryParam(API_ID_PARAM.to_owned()))?;
    let timestamp =
        timestamp.ok_or_else(|| AuthError::MissingQueryParam(TIMESTAMP_PARAM.to_owned()))?;
    let signature =
        signature.ok_or_else(|| AuthError::MissingQueryParam(SIGNATURE_PARAM.to_owned()))?;

    let timestamp = Timestamp::parse(&timestamp)?;
    let api_key = credential_provider.get_api_key(&api_id)?;

    debug!(api_id = %api_id, %timestamp, "Verifying request signature");

    verify(&api_key, &api_id, &timestamp, body, &signature)?;

    Ok(VerifiedRequest { api_id, timestamp })
}
