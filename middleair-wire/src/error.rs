//! The structured error taxonomy shared by every MiddleAir layer (§7).

use std::{fmt, io};

/// The error kinds named by the specification, plus the I/O and framing
/// failures that occur below them.
///
/// No `thiserror`: `Display`/`Error` are implemented by hand, mirroring
/// `layer-client`'s `InvocationError`.
#[derive(Debug)]
pub enum Error {
    /// Default when a protocol status byte is unrecognized.
    Unknown,
    /// Credential mismatch during the sub-handshake (§4.2).
    Unauthorized,
    /// Policy denial during the sub-handshake.
    Forbidden,
    /// No provider advertises the requested schema.
    NotFound,
    /// An unsupported transport protocol was selected.
    MethodNotAllowed,
    /// A registered service field exceeds the 256-byte cap (§3).
    PayloadTooLarge,
    /// Reserved for future use.
    ExpectationFailed,
    /// Providers exist but every dispatch attempt failed.
    ServiceUnavailable,
    /// A wire-level 400 error envelope sent by the server.
    BadRequest(String),
    /// A wire-level 500 error envelope sent by the server.
    InternalServerError(String),
    /// A frame was shorter than its declared length, or shorter than the
    /// 8-byte length prefix.
    ShortRead,
    /// The secure channel, crypto layer, or envelope codec failed.
    Codec(String),
    /// Underlying I/O failure.
    Io(io::Error),
}

impl Error {
    /// The numeric status code this error carries on the wire (§6, §7).
    pub fn code(&self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::PayloadTooLarge => 413,
            Self::ExpectationFailed => 417,
            Self::ServiceUnavailable => 503,
            Self::BadRequest(_) => 400,
            Self::InternalServerError(_) => 500,
            Self::ShortRead | Self::Codec(_) | Self::Io(_) => 400,
        }
    }

    /// Build the `{code: 400, ..}` envelope the invoker sends on any
    /// non-EOF receive failure (§4.4).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Build the `{code: 500, ..}` envelope the invoker sends when a
    /// handler itself returns an error (§4.4).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalServerError(message.into())
    }

    /// Reconstruct a kind from a wire `(code, message)` pair — used when a
    /// client decodes an incoming error envelope.
    pub fn from_wire(code: i32, message: String) -> Self {
        match code {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            413 => Self::PayloadTooLarge,
            417 => Self::ExpectationFailed,
            503 => Self::ServiceUnavailable,
            500 => Self::InternalServerError(message),
            400 => Self::BadRequest(message),
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown status"),
            Self::Unauthorized => write!(f, "unauthorized: credential mismatch"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not found: no provider for schema"),
            Self::MethodNotAllowed => write!(f, "method not allowed: unsupported transport protocol"),
            Self::PayloadTooLarge => write!(f, "payload too large"),
            Self::ExpectationFailed => write!(f, "expectation failed"),
            Self::ServiceUnavailable => write!(f, "service unavailable"),
            Self::BadRequest(m) => write!(f, "bad request: {m}"),
            Self::InternalServerError(m) => write!(f, "internal server error: {m}"),
            Self::ShortRead => write!(f, "short read: frame truncated"),
            Self::Codec(m) => write!(f, "codec error: {m}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self { Self::Io(e) }
}
