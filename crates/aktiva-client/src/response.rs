//! Response normalization.
//!
//! Every response goes through [`check_response`] first:
//!
//! - 2xx passes through untouched.
//! - Non-2xx with an unexpected `Content-Type` becomes an [`ErrorResponse`]
//!   with one synthetic entry built from the status line. The body is not
//!   decoded.
//! - Non-2xx with the expected media type has its body decoded (leniently) as
//!   `{"message": ..., "MessageDetail": ...}`, with keys matched regardless of
//!   case. An object without a message falls back to the status line. An
//!   empty body still yields an error, with no entries.
//!
//! Successful responses are then decoded into a caller-supplied destination by
//! [`decode_into`], strictly or leniently.

use std::fmt;

use bytes::Bytes;
use http::StatusCode;
use http::header::CONTENT_TYPE;
use serde::de::{DeserializeOwned, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::ErrorKind;

/// A buffered HTTP response. The body can be read any number of times.
pub type ApiResponse = http::Response<Bytes>;

/// One error reported for a failed request.
///
/// Deserialization matches the `message` and `MessageDetail` keys without
/// regard to case, so both `{"message": ..}` and `{"Message": ..}` decode.
/// Other keys are ignored and a `null` value counts as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// Short description.
    pub message: String,
    /// Additional detail, if any.
    #[serde(rename = "MessageDetail", skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl<'de> Deserialize<'de> for ErrorEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ErrorEntryVisitor)
    }
}

struct ErrorEntryVisitor;

impl<'de> Visitor<'de> for ErrorEntryVisitor {
    type Value = ErrorEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an error object with `message` and `MessageDetail`")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut message = None;
        let mut detail = None;

        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("message") {
                message = map.next_value::<Option<String>>()?;
            } else if key.eq_ignore_ascii_case("messagedetail") {
                detail = map.next_value::<Option<String>>()?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        Ok(ErrorEntry {
            message: message.unwrap_or_default(),
            detail,
        })
    }
}

impl ErrorEntry {
    /// An entry with a message and no detail.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    /// An entry with a message and a detail.
    pub fn with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail.as_deref() {
            Some(detail) if !detail.is_empty() => write!(f, "{}: {}", self.message, detail),
            _ => f.write_str(&self.message),
        }
    }
}

/// The normalized error for a request that reached the server but failed.
///
/// `kind()` is [`ErrorKind::Protocol`] for non-2xx responses and
/// [`ErrorKind::Decode`] for 2xx responses whose body could not be decoded.
/// The entry list may be empty: a non-2xx response with an empty JSON body is
/// still a failure, it just carries no detail.
#[derive(Debug)]
pub struct ErrorResponse {
    kind: ErrorKind,
    entries: Vec<ErrorEntry>,
    response: ApiResponse,
}

impl ErrorResponse {
    /// Create an error response.
    #[must_use]
    pub fn new(kind: ErrorKind, response: ApiResponse) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            response,
        }
    }

    /// Append an entry.
    pub fn push(&mut self, entry: ErrorEntry) {
        self.entries.push(entry);
    }

    /// Protocol or decode.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The entries, in the order they were recorded.
    #[must_use]
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// The HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// The response that caused this error.
    #[must_use]
    pub fn response(&self) -> &ApiResponse {
        &self.response
    }

    /// Take the response out of the error.
    #[must_use]
    pub fn into_response(self) -> ApiResponse {
        self.response
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str(&status_line(self.response.status()));
        }

        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorResponse {}

/// Format a status as `"<code> <reason>"`, e.g. `"404 Not Found"`.
#[must_use]
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

/// Whether the response's `Content-Type` is `media_type`, ignoring parameters.
#[must_use]
pub fn has_media_type(response: &ApiResponse, media_type: &str) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(media_type))
}

/// Pass 2xx responses through; turn everything else into an [`ErrorResponse`].
///
/// The response body stays buffered on the returned error so callers can
/// inspect it again.
pub fn check_response(response: ApiResponse, media_type: &str) -> Result<ApiResponse, ErrorResponse> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if !has_media_type(&response, media_type) {
        debug!(
            status = status.as_u16(),
            content_type = ?response.headers().get(CONTENT_TYPE),
            "Error response with unexpected content type"
        );
        let mut error = ErrorResponse::new(ErrorKind::Protocol, response);
        error.push(ErrorEntry::new(status_line(status)));
        return Err(error);
    }

    let mut error = ErrorResponse::new(ErrorKind::Protocol, response);
    let body = error.response().body().clone();
    if body.is_empty() {
        return Err(error);
    }

    match serde_json::from_slice::<ErrorEntry>(&body) {
        Ok(mut entry) => {
            // An object without a message still has to describe the failure.
            if entry.message.is_empty() {
                entry.message = status_line(status);
            }
            error.push(entry);
        }
        Err(e) => error.push(ErrorEntry::new(e.to_string())),
    }
    Err(error)
}

/// Decode a successful response's body into `destination`.
///
/// An empty (or whitespace-only) body leaves `destination` untouched. With
/// `strict` set, fields the destination does not know about are rejected.
/// Trailing data after the first JSON value is ignored.
pub fn decode_into<T: DeserializeOwned>(
    response: ApiResponse,
    destination: &mut T,
    strict: bool,
) -> Result<ApiResponse, ErrorResponse> {
    let body = response.body().clone();
    if is_blank(&body) {
        return Ok(response);
    }

    match decode_json::<T>(&body, strict) {
        Ok(value) => {
            *destination = value;
            Ok(response)
        }
        Err(entry) => {
            debug!(error = %entry, strict, "Failed to decode response body");
            let mut error = ErrorResponse::new(ErrorKind::Decode, response);
            error.push(entry);
            Err(error)
        }
    }
}

fn decode_json<T: DeserializeOwned>(body: &[u8], strict: bool) -> Result<T, ErrorEntry> {
    let mut de = serde_json::Deserializer::from_slice(body);

    if !strict {
        return T::deserialize(&mut de).map_err(|e| ErrorEntry::new(e.to_string()));
    }

    let mut unknown = Vec::new();
    let value = serde_ignored::deserialize(&mut de, |path| unknown.push(path.to_string()))
        .map_err(|e| ErrorEntry::new(e.to_string()))?;

    match unknown.first() {
        None => Ok(value),
        Some(field) => Err(ErrorEntry::new(format!("unknown field `{field}`"))),
    }
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}
