use std::sync::Arc;

use middleair_client::{ClientProxy, Options};
use middleair_discovery::descriptor::{Descriptor, Metadata, Provider};
use middleair_discovery::directory::RemoteDirectory;
use middleair_server::{Credentials, Invoker, Options as ServerOptions, Protocol, ServerError, ServerProxy};
use middleair_wire::{Error, Schema};

struct Ping(u32);

impl Schema for Ping {
    fn type_name() -> &'static str { "test.Ping" }
    fn encode(&self) -> Vec<u8> { self.0.to_le_bytes().to_vec() }
    fn decode(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Ping(u32::from_le_bytes(bytes.try_into().map_err(|_| Error::Codec("bad ping".into()))?)))
    }
}

async fn spawn_echo_server() -> u16 {
    let mut registry = ServerProxy::new();
    registry.register::<Ping, Ping, _, _>("test.Ping", vec![], |req: Ping| async move {
        if req.0 == 0 {
            Err(ServerError::Declined { code: 409, message: "zero rejected".to_string() })
        } else {
            Ok(Ping(req.0 + 1))
        }
    });

    let invoker = Invoker::new(Arc::new(registry), ServerOptions { port: 0, protocol: Protocol::Tcp }, None)
        .await
        .unwrap();
    let port = invoker.listener().listener().local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let identity = middleair_crypto::LocalIdentity::generate().unwrap();
            let mut conn = match invoker.accept(identity, &Credentials::default()).await {
                Ok(c) => c,
                Err(_) => return,
            };
            invoker.serve(&mut conn).await.ok();
        }
    });

    port
}

fn descriptor_for(port: u16) -> Descriptor {
    Descriptor {
        uuid: "test.Ping".to_string(),
        provider: Provider { host: "127.0.0.1".to_string(), port },
        tags: Default::default(),
        metadata: Metadata::default(),
    }
}

/// §8 invariant 6: a client invocation of a live provider yields the
/// handler's produced response, decoded back to the caller's type.
#[tokio::test]
async fn end_to_end_invoke_round_trips_the_handler_response() {
    let port = spawn_echo_server().await;

    let directory = Arc::new(RemoteDirectory::new());
    directory.observe(descriptor_for(port)).await;

    let proxy = ClientProxy::new(directory);
    let response: Ping = proxy.invoke(&Ping(41), &Options::default()).await.unwrap();
    assert_eq!(response.0, 42);
}

/// A handler-declined request surfaces as a structured error rather than
/// a silent drop (§8 invariant 6).
#[tokio::test]
async fn declined_request_surfaces_as_an_error() {
    let port = spawn_echo_server().await;

    let directory = Arc::new(RemoteDirectory::new());
    directory.observe(descriptor_for(port)).await;

    let proxy = ClientProxy::new(directory);
    let result: Result<Ping, _> = proxy.invoke(&Ping(0), &Options::default()).await;
    assert!(result.is_err());
}

/// `Persistent=true` reuses the same pooled connection for repeated calls
/// to the same provider (§8 invariant 8).
#[tokio::test]
async fn persistent_option_reuses_one_pooled_connection() {
    let port = spawn_echo_server().await;

    let directory = Arc::new(RemoteDirectory::new());
    directory.observe(descriptor_for(port)).await;

    let proxy = ClientProxy::new(directory);
    let options = Options { persistent: true, ..Default::default() };

    let first: Ping = proxy.invoke(&Ping(1), &options).await.unwrap();
    let second: Ping = proxy.invoke(&Ping(2), &options).await.unwrap();
    assert_eq!(first.0, 2);
    assert_eq!(second.0, 3);

    let errors = proxy.close_persistent_conns().await;
    assert!(errors.is_empty());
}
