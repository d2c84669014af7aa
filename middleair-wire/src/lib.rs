//! # middleair-wire
//!
//! Framing and the self-describing envelope: the two leaf layers every
//! other MiddleAir crate builds on.
//!
//! | Module       | Contents                                             |
//! |--------------|-------------------------------------------------------|
//! | [`framing`]  | Length-prefixed record encode/decode, [`framing::FramedStream`] |
//! | [`envelope`] | [`envelope::Envelope`], [`envelope::Schema`] seam for caller types |
//! | [`error`]    | [`Error`] — the structured taxonomy every layer shares |

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod error;
pub mod framing;

pub use envelope::{Envelope, Schema, WireError};
pub use error::Error;
pub use framing::{FramedStream, MAX_CHUNK, MAX_DATAGRAM, MAX_PAYLOAD, decode_frame, encode_frame};
