//! Client-facing error type (§7 "Client-side per-provider errors are
//! logged and the next provider tried; only the aggregate outcome
//! (`NotFound` or `ServiceUnavailable`) surfaces unless a request
//! succeeds"). Wraps [`middleair_wire::Error`] the same way
//! `layer_client_core`'s `SignInError` wraps its inner `Error`.

use std::fmt;

use middleair_wire::Error;

/// Outcome of a dispatched client call.
#[derive(Debug)]
pub enum InvokeError {
    /// No remote descriptor matches the requested schema (§4.5
    /// "Resolution").
    NotFound,
    /// At least one candidate existed but every attempt failed (§4.5
    /// "Dispatch strategy").
    ServiceUnavailable,
    /// A single candidate's own handler declined with a structured error,
    /// surfaced as-is when it is the only thing the caller asked about
    /// (e.g. a persistent-connection invoke outside the resolve/dispatch
    /// path).
    Other(Error),
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found: no provider for schema"),
            Self::ServiceUnavailable => write!(f, "service unavailable: every candidate failed"),
            Self::Other(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InvokeError {}

impl From<Error> for InvokeError {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound => Self::NotFound,
            Error::ServiceUnavailable => Self::ServiceUnavailable,
            other => Self::Other(other),
        }
    }
}
