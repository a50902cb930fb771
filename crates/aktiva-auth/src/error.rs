//! Error types for request signing and verification.

/// Errors that can occur while handling signed Aktiva requests.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A timestamp string is not in the `yyyyMMddHHmmss` format.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A required authentication query parameter is missing.
    #[error("Missing required query parameter: {0}")]
    MissingQueryParam(String),

    /// The API id was not found in the credential store.
    #[error("API id not found: {0}")]
    ApiIdNotFound(String),

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}
