//! # middleair-client
//!
//! The client proxy (§4.5): discovery-backed resolution, tag filtering,
//! a persistent connection pool, and first-success/broadcast dispatch.
//!
//! | Module        | Contents                                             |
//! |----------------|-------------------------------------------------------|
//! | [`options`]    | [`options::Options`] — per-call resolution/dispatch knobs |
//! | [`tagfilter`]  | Strict/any-match tag filtering over a descriptor's tag set |
//! | [`connection`] | [`connection::Connection`] — one secure channel, handshake through invoke |
//! | [`pool`]       | [`pool::ConnectionPool`] — `provider -> connection`, at most one per provider |
//! | [`proxy`]      | [`proxy::ClientProxy`] — resolve/filter/dispatch facade    |
//! | [`errors`]     | [`errors::InvokeError`] — `NotFound`/`ServiceUnavailable`/wrapped |

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod connection;
pub mod errors;
pub mod options;
pub mod pool;
pub mod proxy;
pub mod tagfilter;

pub use connection::Connection;
pub use errors::InvokeError;
pub use options::Options;
pub use pool::ConnectionPool;
pub use proxy::ClientProxy;
