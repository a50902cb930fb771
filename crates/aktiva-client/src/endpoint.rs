//! Endpoint template resolution.
//!
//! Endpoints are written as path templates with named placeholders:
//!
//! ```text
//! v2/getinvoice/{{.id}}
//! ```
//!
//! A placeholder is `{{.name}}` (whitespace inside the braces is allowed) and
//! is replaced by the percent-encoded value of `name` from a [`PathParams`]
//! mapping. Resolution is pure and fails loudly: a placeholder without a
//! value is an error, never an empty path segment.

use std::collections::{BTreeMap, HashMap};

use http::Uri;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::EndpointError;

/// Characters encoded in substituted values.
///
/// Everything except RFC 3986 unreserved characters, so a value can never
/// introduce a path separator or a query string.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Supplies named values for path template placeholders.
pub trait PathParams {
    /// The parameter mapping, consumed once per resolution.
    fn params(&self) -> HashMap<String, String>;
}

/// Path parameters for endpoints without placeholders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoParams;

impl PathParams for NoParams {
    fn params(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> PathParams for HashMap<K, V> {
    fn params(&self) -> HashMap<String, String> {
        collect(self.iter())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> PathParams for BTreeMap<K, V> {
    fn params(&self) -> HashMap<String, String> {
        collect(self.iter())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> PathParams for [(K, V)] {
    fn params(&self) -> HashMap<String, String> {
        collect(self.iter().map(|(k, v)| (k, v)))
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> PathParams for [(K, V); N] {
    fn params(&self) -> HashMap<String, String> {
        self.as_slice().params()
    }
}

impl<P: PathParams + ?Sized> PathParams for &P {
    fn params(&self) -> HashMap<String, String> {
        (**self).params()
    }
}

fn collect<'a, K, V>(iter: impl Iterator<Item = (&'a K, &'a V)>) -> HashMap<String, String>
where
    K: AsRef<str> + 'a,
    V: AsRef<str> + 'a,
{
    iter.map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
        .collect()
}

/// Expand every placeholder in `template` from `params`.
///
/// # Errors
///
/// - [`EndpointError::MissingParam`] if a placeholder has no value
/// - [`EndpointError::MalformedTemplate`] for an unterminated `{{` or an action
///   that is not a `.name` reference
///
/// # Examples
///
/// ```
/// use aktiva_client::endpoint::expand_template;
///
/// let path = expand_template("invoices/{{.id}}/rows", &[("id", "A 1")]).unwrap();
/// assert_eq!(path, "invoices/A%201/rows");
/// ```
pub fn expand_template(template: &str, params: &dyn PathParams) -> Result<String, EndpointError> {
    let values = params.params();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open
            .find(CLOSE)
            .ok_or_else(|| malformed(template, "unterminated placeholder"))?;

        let name = parse_action(template, &after_open[..end])?;
        let value = values
            .get(name)
            .ok_or_else(|| EndpointError::MissingParam(name.to_owned()))?;
        out.extend(utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET));

        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Join `base` and `template`, expand placeholders, and parse the result.
///
/// A single `/` is kept between the base and the template.
///
/// # Errors
///
/// Fails with the errors of [`expand_template`], or
/// [`EndpointError::InvalidUri`] if the expanded string is not a URI.
pub fn resolve(base: &str, template: &str, params: &dyn PathParams) -> Result<Uri, EndpointError> {
    let joined = match (base.ends_with('/'), template.strip_prefix('/')) {
        (true, Some(stripped)) => format!("{base}{stripped}"),
        _ => format!("{base}{template}"),
    };
    let expanded = expand_template(&joined, params)?;

    expanded
        .parse::<Uri>()
        .map_err(|source| EndpointError::InvalidUri {
            uri: expanded.clone(),
            source,
        })
}

/// Extract `name` from a `.name` action.
fn parse_action<'a>(template: &str, action: &'a str) -> Result<&'a str, EndpointError> {
    let action = action.trim();
    let name = action
        .strip_prefix('.')
        .ok_or_else(|| malformed(template, &format!("unsupported action {action:?}")))?;

    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(malformed(
            template,
            &format!("invalid parameter name {name:?}"),
        ));
    }

    Ok(name)
}

fn malformed(template: &str, reason: &str) -> EndpointError {
    EndpointError::MalformedTemplate {
        template: template.to_owned(),
        reason: reason.to_owned(),
    }
}
