//! # middleair — peer-to-peer service discovery and remote invocation
//!
//! `middleair` is a modular Rust library for LAN-local service discovery
//! and encrypted remote invocation. It consists of five focused
//! sub-crates wired together here for convenience:
//!
//! | Sub-crate             | Role                                                      |
//! |------------------------|------------------------------------------------------------|
//! | `middleair-wire`      | Length-prefixed framing, the self-describing envelope, the error taxonomy |
//! | `middleair-crypto`    | Ephemeral RSA/OpenPGP handshake and the encrypted record codec |
//! | `middleair-discovery` | Multicast broadcaster/listener/ripper, remote directory, callbacks |
//! | `middleair-server`    | Shared listener registry, credential handshake, dispatch loop |
//! | `middleair-client`    | Resolution, tag filtering, persistent pool, dispatch strategies |
//!
//! ## Quick start: provider
//!
//! ```rust,no_run
//! use middleair::server::{ServerProxy, Invoker, Options, Protocol, Credentials};
//! use middleair::crypto::LocalIdentity;
//! use middleair::wire::{Error, Schema};
//! use std::sync::Arc;
//!
//! struct Ping(u32);
//! impl Schema for Ping {
//!     fn type_name() -> &'static str { "demo.Ping" }
//!     fn encode(&self) -> Vec<u8> { self.0.to_le_bytes().to_vec() }
//!     fn decode(b: &[u8]) -> Result<Self, Error> {
//!         Ok(Ping(u32::from_le_bytes(b.try_into().map_err(|_| Error::Codec("bad ping".into()))?)))
//!     }
//! }
//!
//! # async fn run() -> Result<(), Error> {
//! let mut registry = ServerProxy::new();
//! registry.register::<Ping, Ping, _, _>("demo.Ping", vec![], |req: Ping| async move {
//!     Ok(Ping(req.0 + 1))
//! });
//!
//! let invoker = Invoker::new(Arc::new(registry), Options { port: 9000, protocol: Protocol::Tcp }, None).await?;
//! let identity = LocalIdentity::from_env_or_generate()?;
//! let mut conn = invoker.accept(identity, &Credentials::default()).await?;
//! invoker.serve(&mut conn).await
//! # }
//! ```
//!
//! ## Quick start: discovery
//!
//! ```rust,no_run
//! use middleair::discovery::Discovery;
//!
//! # async fn run() {
//! let discovery = Discovery::new(9000).await;
//! // discovery.spawn_tasks(socket, destinations) once a multicast socket is bound.
//! let _ = discovery.registry();
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Re-export of [`middleair_wire`] — framing, the self-describing envelope, the error taxonomy.
pub use middleair_wire as wire;

/// Re-export of [`middleair_crypto`] — the RSA/OpenPGP handshake and secure session.
pub use middleair_crypto as crypto;

/// Re-export of [`middleair_discovery`] — the multicast discovery plane.
pub use middleair_discovery as discovery;

/// Re-export of [`middleair_server`] — the server invoker.
pub use middleair_server as server;

/// Re-export of [`middleair_client`] — the client proxy.
pub use middleair_client as client;

// ─── Convenience re-exports ───────────────────────────────────────────────────

pub use middleair_wire::{Envelope, Error, Schema, FramedStream};
pub use middleair_crypto::{LocalIdentity, SecureSession};
pub use middleair_discovery::{Descriptor, Discovery, Provider, RemoteDirectory};
pub use middleair_server::{Invoker, ServerProxy};
pub use middleair_client::{ClientProxy, Options};
