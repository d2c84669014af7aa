//! # middleair-crypto
//!
//! The secure channel (§4.2): ephemeral RSA-4096 + OpenPGP handshake,
//! XOR-derived shared secret, and the double-gzip-wrapped symmetric
//! record codec used for every application payload afterward.
//!
//! | Module        | Contents                                             |
//! |----------------|-------------------------------------------------------|
//! | [`entity`]     | [`entity::LocalIdentity`] — ephemeral or environment-supplied keypair |
//! | [`handshake`]  | Sans-IO `step1`/`step2`/`finish` state machine        |
//! | [`session`]    | [`session::SecureSession`] — post-handshake record codec |
//! | [`credential`] | The server-side credential sub-handshake              |

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod gzip;
mod openpgp_io;

pub mod credential;
pub mod entity;
pub mod handshake;
pub mod session;

pub use entity::LocalIdentity;
pub use handshake::{Finished, SECRET_LEN, Step1, Step2, finish, step1, step2};
pub use session::SecureSession;
