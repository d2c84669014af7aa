use std::sync::Arc;
use std::time::Duration;

use middleair_discovery::descriptor::{Descriptor, Metadata, Provider};
use middleair_discovery::directory::{FRESHNESS_WINDOW, RemoteDirectory};
use middleair_discovery::{ServiceRegistry};
use middleair_discovery::broadcaster::broadcast_once;
use middleair_discovery::callbacks::CallbackRegistry;
use middleair_discovery::listener::recv_once;

/// S1 — discovery liveness: node A registers `svc.X` on port 9000; node B
/// observes exactly one live entry with `provider.port == 9000` well
/// within two broadcast intervals; once A stops advertising, B's entry
/// is evicted within one freshness window.
#[tokio::test]
async fn s1_discovery_liveness_and_eviction() {
    let a_socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let b_socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let b_addr = b_socket.local_addr().unwrap();

    let a_registry = ServiceRegistry::new();
    a_registry.register(Descriptor {
        uuid: "svc.X".to_string(),
        provider: Provider { host: "127.0.0.1".to_string(), port: 9000 },
        tags: Default::default(),
        metadata: Metadata::default(),
    }).await.unwrap();

    broadcast_once(&a_socket, &a_registry, &[b_addr]).await.unwrap();

    let b_directory = Arc::new(RemoteDirectory::new());
    let b_callbacks = Arc::new(CallbackRegistry::new());
    recv_once(&b_socket, &b_directory, &b_callbacks).await.unwrap();

    let entries = b_directory.resolve("svc.X").await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].provider.port, 9000);

    tokio::time::sleep(FRESHNESS_WINDOW + Duration::from_millis(50)).await;
    b_directory.evict_stale().await;
    assert!(b_directory.resolve("svc.X").await.is_empty());
}
