//! The Aktiva API client.
//!
//! [`Client`] ties the pipeline together: endpoint resolution, signing,
//! transport and response normalization. It holds no mutable shared state, so
//! clones are cheap and can be used from any number of tasks.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use aktiva_auth::{Credentials, Timestamp, sign};
use http::{Method, Uri};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::endpoint::{PathParams, resolve};
use crate::error::{ClientError, ClientResult};
use crate::request::{ApiRequest, build_request};
use crate::response::{ApiResponse, check_response, decode_into};
use crate::transport::{CompletionCallback, ExchangeOptions, ReqwestTransport, Transport, exchange};

/// Signed-request client for the Merit Aktiva API.
#[derive(Clone)]
pub struct Client {
    credentials: Arc<Credentials>,
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    on_completed: Option<CompletionCallback>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .field("on_completed", &self.on_completed.is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client that talks HTTP through `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the configuration is unusable or the
    /// HTTP client cannot be initialized.
    pub fn new(credentials: Credentials, config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Self::with_transport(credentials, config, Arc::new(ReqwestTransport::with_client(http)))
    }

    /// Create a client over an arbitrary transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL is empty or not an
    /// absolute URI.
    pub fn with_transport(
        credentials: Credentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> ClientResult<Self> {
        let base: Uri = config
            .base_url
            .parse()
            .map_err(|e| ClientError::Config(format!("invalid base URL {:?}: {e}", config.base_url)))?;
        if base.scheme().is_none() || base.authority().is_none() {
            return Err(ClientError::Config(format!(
                "base URL must be absolute: {:?}",
                config.base_url
            )));
        }

        debug!(
            api_id = credentials.api_id(),
            base_url = %config.base_url,
            debug = config.debug,
            strict_decoding = config.strict_decoding,
            "Created Aktiva client"
        );

        Ok(Self {
            credentials: Arc::new(credentials),
            config: Arc::new(config),
            transport,
            on_completed: None,
        })
    }

    /// The API id requests are signed for.
    #[must_use]
    pub fn api_id(&self) -> &str {
        self.credentials.api_id()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL endpoint templates resolve against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Media type of request and response bodies.
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.config.media_type
    }

    /// Charset of request bodies.
    #[must_use]
    pub fn charset(&self) -> &str {
        &self.config.charset
    }

    /// `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.config.user_agent
    }

    /// Whether raw requests and responses are dumped to the trace log.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.config.debug
    }

    /// A copy of this client with wire dumps switched on or off.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.set_debug(debug);
        self
    }

    /// Switch wire dumps on or off for this handle.
    ///
    /// Other clones keep their own setting.
    pub fn set_debug(&mut self, debug: bool) {
        Arc::make_mut(&mut self.config).debug = debug;
    }

    /// A copy of this client that rejects unknown fields in success bodies.
    #[must_use]
    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        Arc::make_mut(&mut self.config).strict_decoding = strict;
        self
    }

    /// A copy of this client that calls `callback` after every response.
    ///
    /// The callback sees the request and the raw response before decoding. A
    /// panic inside it is logged and does not affect the request.
    #[must_use]
    pub fn with_request_completed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ApiRequest, &ApiResponse) + Send + Sync + 'static,
    {
        self.on_completed = Some(Arc::new(callback));
        self
    }

    /// The current time in wire format precision.
    #[must_use]
    pub fn generate_timestamp(&self) -> Timestamp {
        Timestamp::now()
    }

    /// Sign `body` at `timestamp` with this client's credentials.
    #[must_use]
    pub fn generate_signature(&self, timestamp: &Timestamp, body: &[u8]) -> String {
        sign(
            self.credentials.api_key(),
            self.credentials.api_id(),
            timestamp,
            body,
        )
    }

    /// Resolve an endpoint template against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Endpoint`] for missing parameters or malformed
    /// templates.
    pub fn endpoint_url(&self, template: &str, params: &dyn PathParams) -> ClientResult<Uri> {
        Ok(resolve(&self.config.base_url, template, params)?)
    }

    /// Build a signed request with this client's credentials and configuration.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the body cannot be serialized or a
    /// header value is invalid.
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        ctx: Option<RequestContext>,
        method: Method,
        uri: &Uri,
        body: Option<&B>,
    ) -> ClientResult<ApiRequest> {
        build_request(ctx, &self.credentials, &self.config, method, uri, body)
    }

    /// Send `request` and classify the status, without decoding a success body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if no response was received and
    /// [`ClientError::Response`] for non-2xx statuses.
    pub async fn execute(&self, request: &ApiRequest) -> ClientResult<ApiResponse> {
        let response = exchange(self.transport.as_ref(), request, &self.exchange_options()).await?;
        Ok(check_response(response, &self.config.media_type)?)
    }

    /// Send `request` and decode a 2xx body into `destination`.
    ///
    /// An empty success body leaves `destination` unchanged.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus a decode error if the body does not
    /// match `T`.
    pub async fn execute_into<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        destination: &mut T,
    ) -> ClientResult<ApiResponse> {
        let response = self.execute(request).await?;
        Ok(decode_into(
            response,
            destination,
            self.config.strict_decoding,
        )?)
    }

    /// Resolve, build, sign, send and normalize in one call.
    ///
    /// With `destination` set the success body is decoded into it; otherwise
    /// the body is left on the returned response. Resolution and signing run
    /// before the returned future is first polled, so neither `params` nor
    /// `body` is held across the exchange.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the pipeline stages.
    pub fn send<'a, B, T>(
        &'a self,
        ctx: Option<RequestContext>,
        method: Method,
        template: &str,
        params: &dyn PathParams,
        body: Option<&B>,
        destination: Option<&'a mut T>,
    ) -> impl Future<Output = ClientResult<ApiResponse>> + Send + 'a
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send,
    {
        let prepared = self
            .endpoint_url(template, params)
            .and_then(|uri| self.new_request(ctx, method, &uri, body));

        async move {
            let request = prepared?;
            match destination {
                Some(destination) => self.execute_into(&request, destination).await,
                None => self.execute(&request).await,
            }
        }
    }

    fn exchange_options(&self) -> ExchangeOptions {
        ExchangeOptions {
            debug: self.config.debug,
            on_completed: self.on_completed.clone(),
        }
    }
}
