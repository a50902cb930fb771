//! API credentials and credential lookup.
//!
//! [`Credentials`] is the pair a client signs with. The [`CredentialProvider`]
//! trait resolves an API key from an API id on the verifying side, with a
//! [`StaticCredentialProvider`] for tests and local servers.

use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// Environment variable holding the API id.
pub const API_ID_ENV: &str = "AKTIVA_API_ID";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "AKTIVA_API_KEY";

/// The API id and shared secret key a client signs requests with.
///
/// The key is never printed by the `Debug` implementation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_id: String,
    api_key: Vec<u8>,
}

impl Credentials {
    /// Create credentials from an API id and an API key.
    pub fn new(api_id: impl Into<String>, api_key: impl AsRef<[u8]>) -> Self {
        Self {
            api_id: api_id.into(),
            api_key: api_key.as_ref().to_vec(),
        }
    }

    /// Load credentials from `AKTIVA_API_ID` and `AKTIVA_API_KEY`.
    ///
    /// Returns `None` if either variable is unset.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_id = std::env::var(API_ID_ENV).ok()?;
        let api_key = std::env::var(API_KEY_ENV).ok()?;
        Some(Self::new(api_id, api_key))
    }

    /// The public API id, sent with every request as `ApiId`.
    #[must_use]
    pub fn api_id(&self) -> &str {
        &self.api_id
    }

    /// The secret API key used as the HMAC key.
    #[must_use]
    pub fn api_key(&self) -> &[u8] {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Trait for looking up API keys by API id.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the API key for the given API id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ApiIdNotFound`] if the API id is not recognized.
    fn get_api_key(&self, api_id: &str) -> Result<Vec<u8>, AuthError>;
}

/// Fixed set of API keys, for local servers and tests that check signatures.
///
/// ```
/// use aktiva_auth::{CredentialProvider, Credentials, StaticCredentialProvider};
///
/// let client = Credentials::new("merit-demo", "demo-secret");
/// let keys = StaticCredentialProvider::from_credentials([&client]);
///
/// assert_eq!(keys.get_api_key("merit-demo").unwrap(), b"demo-secret");
/// assert!(keys.get_api_key("someone-else").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    keys: HashMap<String, Vec<u8>>,
}

impl StaticCredentialProvider {
    /// Build from `(api_id, api_key)` pairs. A repeated API id keeps its last key.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        Self {
            keys: pairs
                .into_iter()
                .map(|(api_id, api_key)| (api_id.into(), api_key.as_ref().to_vec()))
                .collect(),
        }
    }

    /// Accept the keys of the given client credentials.
    pub fn from_credentials<'a>(credentials: impl IntoIterator<Item = &'a Credentials>) -> Self {
        Self::new(
            credentials
                .into_iter()
                .map(|c| (c.api_id().to_owned(), c.api_key().to_vec())),
        )
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_api_key(&self, api_id: &str) -> Result<Vec<u8>, AuthError> {
        self.keys
            .get(api_id)
            .cloned()
            .ok_or_else(|| AuthError::ApiIdNotFound(api_id.to_owned()))
    }
}
