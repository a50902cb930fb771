//! The signed request timestamp.
//!
//! The timestamp appears twice in every request: inside the signed string and
//! as the `timestamp` query parameter. Both uses go through the single
//! [`fmt::Display`] implementation so they can never diverge. Changing
//! [`WIRE_FORMAT`] is a breaking change to the server contract.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::error::AuthError;

/// Wire format of the timestamp (`yyyyMMddHHmmss`, UTC).
pub const WIRE_FORMAT: &str = "%Y%m%d%H%M%S";

/// A point in time at second precision, formatted as `yyyyMMddHHmmss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Capture the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Wrap a `DateTime`, truncating it to whole seconds.
    #[must_use]
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(0))
    }

    /// Parse a timestamp from its wire format.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidTimestamp`] if the input is not `yyyyMMddHHmmss`.
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        NaiveDateTime::parse_from_str(input, WIRE_FORMAT)
            .map(|naive| Self(naive.and_utc()))
            .map_err(|_| AuthError::InvalidTimestamp(input.to_owned()))
    }

    /// The underlying `DateTime`.
    #[must_use]
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WIRE_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}

impl serde::Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
