//! Open a client-side secure channel to a provider: TCP connect,
//! handshake, submit credentials (§4.2, §4.5 "open a new secure channel
//! (client-side handshake + credential submission)").

use tokio::net::TcpStream;

use middleair_crypto::{LocalIdentity, SecureSession};
use middleair_discovery::Provider;
use middleair_wire::{Envelope, Error, FramedStream, Schema};

/// An open secure channel to one provider.
pub struct Connection {
    pub(crate) framed: FramedStream<TcpStream>,
    pub(crate) session: SecureSession,
}

impl Connection {
    /// Connect, handshake, and submit `credentials`; fails if the server
    /// rejects them (§4.2 step 4: non-200 closes the connection).
    pub async fn open(provider: &Provider, identity: LocalIdentity, credentials: &[u8]) -> Result<Self, Error> {
        let stream = TcpStream::connect((provider.host.as_str(), provider.port)).await?;
        let mut framed = FramedStream::new(stream);
        let session = SecureSession::handshake(&mut framed, identity).await?;

        session.write_record(&mut framed, credentials).await?;
        let status = session.read_record(&mut framed).await?.ok_or(Error::ShortRead)?;
        let status_byte = *status.first().ok_or(Error::ShortRead)?;
        middleair_crypto::credential::interpret_status(status_byte)?;

        Ok(Self { framed, session })
    }

    /// One request/reply round trip (§4.5 "Invoke"): marshal `request` as a
    /// self-describing envelope, write one record, read one record, decode
    /// as an envelope, and surface its `error` if populated. The channel is
    /// half-duplex per pair (§5) — callers must serialize invocations on a
    /// shared connection themselves.
    pub async fn invoke<Req: Schema, Resp: Schema>(&mut self, request: &Req) -> Result<Resp, Error> {
        let request_envelope = Envelope::pack(request);
        self.session.write_record(&mut self.framed, &request_envelope.to_bytes()).await?;

        let record = self.session.read_record(&mut self.framed).await?.ok_or(Error::ShortRead)?;
        let response_envelope = Envelope::from_bytes(&record)?;
        response_envelope.unpack()
    }
}
