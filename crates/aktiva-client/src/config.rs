//! Client configuration.
//!
//! Configuration is fixed when a [`Client`](crate::Client) is built. Defaults
//! target the production Aktiva API and can be overridden from environment
//! variables.

use std::env;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://aktiva.merit.ee/api/v1/";

/// Media type for request and response bodies.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Charset announced in the `Content-Type` header.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("aktiva-client/", env!("CARGO_PKG_VERSION"));

/// Configuration for an Aktiva API client.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Base URL that endpoint templates are appended to.
    pub base_url: String,
    /// Media type of request and response bodies.
    pub media_type: String,
    /// Charset of request bodies.
    pub charset: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Dump raw requests and responses to the trace log.
    pub debug: bool,
    /// Reject unknown fields when decoding success bodies.
    pub strict_decoding: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            media_type: DEFAULT_MEDIA_TYPE.to_owned(),
            charset: DEFAULT_CHARSET.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            debug: false,
            strict_decoding: false,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `AKTIVA_BASE_URL` | `https://aktiva.merit.ee/api/v1/` |
    /// | `AKTIVA_USER_AGENT` | `aktiva-client/<version>` |
    /// | `AKTIVA_DEBUG` | `false` |
    /// | `AKTIVA_STRICT_DECODING` | `false` |
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("AKTIVA_BASE_URL").unwrap_or(defaults.base_url),
            user_agent: env::var("AKTIVA_USER_AGENT").unwrap_or(defaults.user_agent),
            debug: env_bool("AKTIVA_DEBUG", false),
            strict_decoding: env_bool("AKTIVA_STRICT_DECODING", false),
            ..defaults
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the media type.
    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Set the charset.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable or disable wire dumps.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enable or disable strict decoding of success bodies.
    #[must_use]
    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        self.strict_decoding = strict;
        self
    }

    /// The `Content-Type` header value: `<media type>; charset=<charset>`.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("{}; charset={}", self.media_type, self.charset)
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}
