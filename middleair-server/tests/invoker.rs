use std::sync::Arc;

use middleair_crypto::LocalIdentity;
use middleair_server::{Credentials, Invoker, Options, Protocol, ServerProxy};
use middleair_wire::{Envelope, FramedStream};

/// S5 — dispatch 404: a client request for schema `"ghost"`, unknown to
/// the server, produces a 400 error envelope and the server loop exits
/// cleanly.
#[tokio::test]
async fn s5_dispatch_404() {
    let proxy = Arc::new(ServerProxy::new());
    let options = Options { port: 0, protocol: Protocol::Tcp };
    let invoker = Invoker::new(proxy, options, None).await.unwrap();
    let port = invoker.listener().listener().local_addr().unwrap().port();

    let server_task = tokio::spawn(async move {
        let identity = LocalIdentity::generate().unwrap();
        let mut conn = invoker.accept(identity, &Credentials::default()).await.unwrap();
        invoker.serve(&mut conn).await.unwrap();
    });

    let client_stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let mut framed = FramedStream::new(client_stream);
    let client_identity = LocalIdentity::generate().unwrap();
    let session = middleair_crypto::SecureSession::handshake(&mut framed, client_identity).await.unwrap();

    session.write_record(&mut framed, b"").await.unwrap();
    let status = session.read_record(&mut framed).await.unwrap().unwrap();
    assert_eq!(status, vec![middleair_crypto::credential::STATUS_OK]);

    let request = Envelope::new("ghost", Vec::new());
    session.write_record(&mut framed, &request.to_bytes()).await.unwrap();

    let reply_bytes = session.read_record(&mut framed).await.unwrap().unwrap();
    let reply = Envelope::from_bytes(&reply_bytes).unwrap();
    assert!(reply.error.is_some());
    assert_eq!(reply.error.unwrap().code, 400);

    server_task.await.unwrap();
}
