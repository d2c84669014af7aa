//! Invoker: construction, `Accept`, `Loop` (§4.4).

use std::sync::Arc;

use tokio::net::TcpStream;

use middleair_crypto::credential::{STATUS_OK, check_credential};
use middleair_crypto::{LocalIdentity, SecureSession};
use middleair_discovery::registry::{RegistrationHandle, ServiceRegistry as DiscoveryRegistry};
use middleair_discovery::{Descriptor, Metadata, Provider};
use middleair_wire::{Envelope, Error, FramedStream};

use crate::listener_registry::SharedListener;
use crate::options::Options;
use crate::registry::{ServerError, ServerProxy};

/// Credential configuration applied to every accepted connection
/// (§4.2 "Credential sub-handshake").
#[derive(Default, Clone)]
pub struct Credentials {
    /// The expected credential blob. Empty means "accept anything".
    pub expected: Vec<u8>,
    /// When true, the connection is always rejected regardless of match
    /// (§6 status byte `0x93`).
    pub forbidden: bool,
}

/// A secure, credential-checked connection, ready for [`Invoker::serve`].
pub struct AcceptedConnection {
    framed: FramedStream<TcpStream>,
    session: SecureSession,
}

/// Server invoker: owns a shared listener and a registry of handlers
/// (§4.4).
pub struct Invoker {
    proxy: Arc<ServerProxy>,
    listener: SharedListener,
    discovery: Option<Arc<DiscoveryRegistry>>,
    discovery_handles: Vec<RegistrationHandle>,
}

impl Invoker {
    /// §4.4 point 1-2: open/share the listener on `options.port`, then
    /// register every proxy entry with discovery (if provided).
    pub async fn new(
        proxy: Arc<ServerProxy>,
        options: Options,
        discovery: Option<Arc<DiscoveryRegistry>>,
    ) -> Result<Self, Error> {
        options.validate()?;
        let listener = SharedListener::acquire(options.port).await?;

        let mut discovery_handles = Vec::new();
        if let Some(discovery) = &discovery {
            for entry in proxy.entries() {
                let mut tags: [String; middleair_discovery::descriptor::TAG_COUNT] = Default::default();
                for (slot, tag) in tags.iter_mut().zip(entry.tags.iter()) {
                    *slot = tag.clone();
                }
                let descriptor = Descriptor {
                    uuid: entry.uuid.clone(),
                    provider: Provider { host: String::new(), port: options.port },
                    tags,
                    metadata: Metadata::from_env(),
                };
                let handle = discovery.register(descriptor).await?;
                discovery_handles.push(handle);
            }
        }

        Ok(Self { proxy, listener, discovery, discovery_handles })
    }

    /// The shared listener backing this invoker — exposed so callers (and
    /// tests binding to port 0) can read the actual bound address.
    pub fn listener(&self) -> &SharedListener { &self.listener }

    /// §4.4 "Accept(credentials)": block on `listener.accept()`, establish
    /// the secure channel, run the credential sub-handshake.
    pub async fn accept(&self, identity: LocalIdentity, credentials: &Credentials) -> Result<AcceptedConnection, Error> {
        let (stream, peer) = self.listener.listener().accept().await?;
        tracing::debug!(%peer, "accepted connection");

        let mut framed = FramedStream::new(stream);
        let session = SecureSession::handshake(&mut framed, identity).await?;

        let received = session.read_record(&mut framed).await?.ok_or(Error::ShortRead)?;
        let status = check_credential(&credentials.expected, &received, credentials.forbidden);
        session.write_record(&mut framed, &[status]).await?;

        if status != STATUS_OK {
            return Err(Error::from_wire(status as i32, "credential rejected"));
        }

        Ok(AcceptedConnection { framed, session })
    }

    /// §4.4 "Loop()": read one data record, dispatch, repeat until EOF or
    /// a framing catastrophe.
    pub async fn serve(&self, connection: &mut AcceptedConnection) -> Result<(), Error> {
        loop {
            let record = match connection.session.read_record(&mut connection.framed).await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => return Ok(()),
                Err(e) => {
                    let response = Envelope::error(400, format!("bad request: {e}"));
                    connection.session.write_record(&mut connection.framed, &response.to_bytes()).await?;
                    continue;
                }
            };

            let envelope = match Envelope::from_bytes(&record) {
                Ok(e) => e,
                Err(e) => {
                    let response = Envelope::error(400, format!("malformed envelope: {e}"));
                    connection.session.write_record(&mut connection.framed, &response.to_bytes()).await?;
                    continue;
                }
            };

            let type_name = envelope.type_name.clone();
            let Some(entry) = self.proxy.find(&type_name) else {
                // §4.4 "dispatch lookup failure ... terminates the loop";
                // S5 sends the 400 envelope first so the client surfaces
                // the failure rather than seeing a bare disconnect.
                let response = Envelope::error(400, format!("no provider for schema {type_name}"));
                connection.session.write_record(&mut connection.framed, &response.to_bytes()).await?;
                return Ok(());
            };

            let response = match (entry.handler)(envelope).await {
                Ok(response_envelope) => response_envelope,
                Err(ServerError::Fault(message)) => {
                    tracing::warn!(error = %message, "handler fault");
                    Envelope::error(500, message)
                }
                Err(ServerError::Declined { code, message }) => Envelope::error(code, message),
            };

            connection.session.write_record(&mut connection.framed, &response.to_bytes()).await?;
        }
    }

    /// On loop exit: unregister every discovery entry and release the
    /// listener refcount (the latter happens automatically when `self`
    /// drops).
    pub async fn shutdown(self) {
        if let Some(discovery) = &self.discovery {
            for handle in self.discovery_handles {
                discovery.unregister(handle).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use middleair_wire::Schema;

    struct Ghost;
    impl Schema for Ghost {
        fn type_name() -> &'static str { "ghost" }
        fn encode(&self) -> Vec<u8> { Vec::new() }
        fn decode(_: &[u8]) -> Result<Self, Error> { Ok(Ghost) }
    }

    /// S5 — dispatch 404: a request for an unregistered schema terminates
    /// the loop with `NotFound` without tearing down the shared listener.
    #[tokio::test]
    async fn unregistered_schema_is_not_found() {
        let proxy = Arc::new(ServerProxy::new());
        assert!(proxy.find(Ghost::type_name()).is_none());
    }
}
