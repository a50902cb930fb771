//! Signed request construction.
//!
//! [`build_request`] turns a method, a resolved URI and an optional body into
//! a transport-ready [`ApiRequest`]:
//!
//! 1. Serialize the body to JSON once.
//! 2. Capture a single timestamp.
//! 3. Sign `ApiId + timestamp + body` with the API key.
//! 4. Append `ApiId`, `timestamp` and `signature` to the query string.
//! 5. Set `Content-Type`, `Accept` and `User-Agent`.
//!
//! The signed body bytes are moved into the request unchanged.

use aktiva_auth::{
    API_ID_PARAM, Credentials, SIGNATURE_PARAM, TIMESTAMP_PARAM, Timestamp, sign,
};
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderValue, USER_AGENT};
use http::{Method, Uri};
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::error::{ClientError, ClientResult};

/// A fully signed request, ready for a [`Transport`](crate::Transport).
pub type ApiRequest = http::Request<Bytes>;

/// Serialize an optional body into the exact bytes that will be signed and sent.
///
/// `None` yields an empty body.
pub fn encode_body<B: Serialize + ?Sized>(body: Option<&B>) -> ClientResult<Bytes> {
    match body {
        Some(body) => serde_json::to_vec(body)
            .map(Bytes::from)
            .map_err(ClientError::Serialize),
        None => Ok(Bytes::new()),
    }
}

/// Append the authentication parameters to `uri`, after any existing query.
pub fn append_auth_query(
    uri: &Uri,
    api_id: &str,
    timestamp: &Timestamp,
    signature: &str,
) -> ClientResult<Uri> {
    let auth = form_urlencoded::Serializer::new(String::new())
        .append_pair(API_ID_PARAM, api_id)
        .append_pair(TIMESTAMP_PARAM, &timestamp.to_string())
        .append_pair(SIGNATURE_PARAM, signature)
        .finish();

    let path = uri.path();
    let path_and_query = match uri.query() {
        Some(existing) if !existing.is_empty() => format!("{path}?{existing}&{auth}"),
        _ => format!("{path}?{auth}"),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(
        path_and_query
            .parse()
            .map_err(|e: http::uri::InvalidUri| ClientError::InvalidRequest(e.into()))?,
    );
    Uri::from_parts(parts).map_err(|e| ClientError::InvalidRequest(e.into()))
}

/// Build a signed request.
///
/// The timestamp is generated here, once, and used for both the signature and
/// the `timestamp` query parameter.
pub fn build_request<B: Serialize + ?Sized>(
    ctx: Option<RequestContext>,
    credentials: &Credentials,
    config: &ClientConfig,
    method: Method,
    uri: &Uri,
    body: Option<&B>,
) -> ClientResult<ApiRequest> {
    let body = encode_body(body)?;
    build_signed(
        ctx,
        credentials,
        config,
        method,
        uri,
        body,
        Timestamp::now(),
    )
}

/// Build a signed request around pre-serialized body bytes and a given timestamp.
pub fn build_signed(
    ctx: Option<RequestContext>,
    credentials: &Credentials,
    config: &ClientConfig,
    method: Method,
    uri: &Uri,
    body: Bytes,
    timestamp: Timestamp,
) -> ClientResult<ApiRequest> {
    let signature = sign(
        credentials.api_key(),
        credentials.api_id(),
        &timestamp,
        &body,
    );
    let uri = append_auth_query(uri, credentials.api_id(), &timestamp, &signature)?;

    debug!(
        method = %method,
        uri = %uri,
        body_len = body.len(),
        %timestamp,
        "Built signed request"
    );

    let mut request = http::Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, header_value("Content-Type", &config.content_type())?)
        .header(ACCEPT, header_value("Accept", &config.media_type)?)
        .header(USER_AGENT, header_value("User-Agent", &config.user_agent)?)
        .body(body)?;

    if let Some(ctx) = ctx {
        request.extensions_mut().insert(ctx);
    }

    Ok(request)
}

fn header_value(name: &'static str, value: &str) -> ClientResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|source| ClientError::InvalidHeader { name, source })
}
