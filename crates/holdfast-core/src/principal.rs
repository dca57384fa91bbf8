//! Principals: the actors that hold capabilities and own assets.
//!
//! A principal is written `scheme:payload`, for example `local:alice`. The
//! registry never interprets either half; two principals are the same owner
//! exactly when both halves match. Any value that can be built here can also
//! be parsed back from its string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A principal in the form `scheme:payload`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal {
    scheme: String,
    payload: String,
}

impl Principal {
    /// Create a new principal. The scheme must be non-empty and free of
    /// `:`; the payload must be non-empty.
    pub fn new(
        scheme: impl Into<String>,
        payload: impl Into<String>,
    ) -> Result<Self, PrincipalParseError> {
        let scheme = scheme.into();
        let payload = payload.into();

        if scheme.is_empty() {
            return Err(PrincipalParseError::EmptyScheme);
        }
        if scheme.contains(':') {
            return Err(PrincipalParseError::ColonInScheme(scheme));
        }
        if payload.is_empty() {
            return Err(PrincipalParseError::EmptyPayload(scheme));
        }

        Ok(Self { scheme, payload })
    }

    /// A principal under the `local` scheme.
    pub fn local(name: impl Into<String>) -> Result<Self, PrincipalParseError> {
        Self::new("local", name)
    }

    /// The scheme (e.g., "local", "url", "ed25519").
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The payload (interpretation depends on scheme).
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.payload)
    }
}

impl FromStr for Principal {
    type Err = PrincipalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, payload) = s
            .split_once(':')
            .ok_or_else(|| PrincipalParseError::MissingColon(s.to_string()))?;

        Self::new(scheme, payload)
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.to_string()
    }
}

/// Error parsing a principal string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalParseError {
    #[error("principal must contain ':' separator, got: {0}")]
    MissingColon(String),
    #[error("principal scheme cannot be empty")]
    EmptyScheme,
    #[error("principal scheme cannot contain ':', got: {0}")]
    ColonInScheme(String),
    #[error("principal payload cannot be empty for scheme '{0}'")]
    EmptyPayload(String),
}
