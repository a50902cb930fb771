//! Human-readable dumps of raw requests and responses.
//!
//! Used for debug logging only. Dumps are built from borrowed data and never
//! touch the bytes that are sent or received.

use std::fmt::Write;

use http::HeaderMap;

use crate::request::ApiRequest;
use crate::response::{ApiResponse, status_line};

/// Render a request as it would appear on the wire.
#[must_use]
pub fn dump_request(request: &ApiRequest) -> String {
    let uri = request.uri();
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_owned(), ToString::to_string);

    let mut out = format!(
        "{} {} {:?}\r\n",
        request.method(),
        target,
        request.version()
    );
    if let Some(authority) = uri.authority() {
        let _ = write!(out, "Host: {authority}\r\n");
    }
    write_headers(&mut out, request.headers());
    write_body(&mut out, request.body());
    out
}

/// Render a response as it would appear on the wire.
#[must_use]
pub fn dump_response(response: &ApiResponse) -> String {
    let mut out = format!(
        "{:?} {}\r\n",
        response.version(),
        status_line(response.status())
    );
    write_headers(&mut out, response.headers());
    write_body(&mut out, response.body());
    out
}

fn write_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        let _ = write!(out, "{name}: {value}\r\n");
    }
    out.push_str("\r\n");
}

fn write_body(out: &mut String, body: &[u8]) {
    out.push_str(&String::from_utf8_lossy(body));
}
