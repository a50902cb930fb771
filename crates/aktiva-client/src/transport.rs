//! Transport abstraction and the exchange adapter.
//!
//! A [`Transport`] performs one HTTP exchange and nothing else. Anything the
//! server requires at the connection level (proxies, TLS settings, NTLM style
//! challenge-response) belongs inside a transport implementation and stays
//! invisible to signing and decoding.
//!
//! [`exchange`] wraps a transport with the per-request behavior shared by all
//! transports: the [`RequestContext`] deadline and cancellation, debug wire
//! dumps, and the completion callback.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::context::RequestContext;
use crate::error::TransportError;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::wire::{dump_request, dump_response};

/// Trace target for raw request and response dumps.
pub const WIRE_TARGET: &str = "aktiva_client::wire";

/// Performs a single HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the fully buffered response.
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Callback invoked once per request after the response arrives, before decoding.
pub type CompletionCallback = Arc<dyn Fn(&ApiRequest, &ApiResponse) + Send + Sync>;

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest::Client`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let response = self
            .client
            .request(request.method().clone(), request.uri().to_string())
            .version(request.version())
            .headers(request.headers().clone())
            .body(request.body().clone())
            .send()
            .await?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        let mut buffered = http::Response::new(body);
        *buffered.status_mut() = status;
        *buffered.version_mut() = version;
        *buffered.headers_mut() = headers;
        Ok(buffered)
    }
}

/// Settings for [`exchange`] that come from the client.
#[derive(Clone, Default)]
pub struct ExchangeOptions {
    /// Dump request and response to [`WIRE_TARGET`].
    pub debug: bool,
    /// Completion callback.
    pub on_completed: Option<CompletionCallback>,
}

impl fmt::Debug for ExchangeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeOptions")
            .field("debug", &self.debug)
            .field("on_completed", &self.on_completed.is_some())
            .finish()
    }
}

/// Run one exchange through `transport`.
///
/// The request's [`RequestContext`], if any, bounds the exchange. The
/// completion callback runs exactly once, only when a response was received;
/// a panic inside it is logged and otherwise ignored.
pub async fn exchange(
    transport: &dyn Transport,
    request: &ApiRequest,
    options: &ExchangeOptions,
) -> Result<ApiResponse, TransportError> {
    if options.debug {
        info!(target: WIRE_TARGET, "{}", dump_request(request));
    }

    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    debug!(method = %request.method(), uri = %request.uri(), "Sending request");
    let response = ctx.run(transport.execute(request)).await?;
    debug!(status = response.status().as_u16(), "Received response");

    if let Some(callback) = &options.on_completed {
        if catch_unwind(AssertUnwindSafe(|| callback(request, &response))).is_err() {
            warn!(uri = %request.uri(), "Request completion callback panicked");
        }
    }

    if options.debug {
        info!(target: WIRE_TARGET, "{}", dump_response(&response));
    }

    Ok(response)
}
