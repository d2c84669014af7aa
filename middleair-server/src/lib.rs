//! # middleair-server
//!
//! The server invoker (§4.4): a process-wide refcounted listener registry,
//! a caller-built handler registry, and the accept/dispatch loop.
//!
//! | Module              | Contents                                      |
//! |-----------------------|------------------------------------------------|
//! | [`options`]          | [`options::Options`], [`options::Protocol`]    |
//! | [`registry`]         | [`registry::ServerProxy`] — handler registration |
//! | [`listener_registry`]| [`listener_registry::SharedListener`] — port refcount |
//! | [`invoker`]          | [`invoker::Invoker`] — Accept/Loop                |

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod invoker;
pub mod listener_registry;
pub mod options;
pub mod registry;

pub use invoker::{AcceptedConnection, Credentials, Invoker};
pub use options::{Options, Protocol};
pub use registry::{ServerError, ServerProxy};
