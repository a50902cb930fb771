//! Signed request pipeline for the Merit Aktiva accounting API.
//!
//! Every call goes through the same chain:
//!
//! 1. [`endpoint`] resolves a path template against the base URL.
//! 2. [`request`] serializes the body, signs it and builds the HTTP request.
//! 3. [`transport`] sends it, honoring the [`RequestContext`].
//! 4. [`response`] classifies the status and decodes the body.
//!
//! [`Client`] wraps the chain behind a single handle.
//!
//! ```no_run
//! use aktiva_auth::Credentials;
//! use aktiva_client::{Client, ClientConfig, NoParams};
//! use http::Method;
//!
//! # async fn run() -> aktiva_client::ClientResult<()> {
//! let client = Client::new(Credentials::new("api-id", "api-key"), ClientConfig::from_env())?;
//! let mut customers = serde_json::Value::Null;
//! client
//!     .send(None, Method::POST, "getcustomers", &NoParams, Some(&serde_json::json!({})), Some(&mut customers))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;
pub mod wire;

pub use client::Client;
pub use config::ClientConfig;
pub use context::RequestContext;
pub use endpoint::{NoParams, PathParams};
pub use error::{ClientError, ClientResult, EndpointError, ErrorKind, TransportError};
pub use request::ApiRequest;
pub use response::{ApiResponse, ErrorEntry, ErrorResponse};
pub use transport::{CompletionCallback, ReqwestTransport, Transport};
