//! Broadcaster: every 500 ms, serialize every registered descriptor as an
//! announcement and send it to each configured multicast destination
//! (§4.3 "Broadcaster").

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::announcement::Announcement;
use crate::registry::ServiceRegistry;

/// §6 "Wire — announcement": primary IPv4 destination.
pub const MULTICAST_V4: &str = "224.0.0.57:13374";
/// §6 "Wire — announcement": optional IPv6 destination.
pub const MULTICAST_V6: &str = "[ff01::39]:13376";

/// §4.3: broadcast tick interval.
pub const BROADCAST_INTERVAL: Duration = Duration::from_millis(500);

/// One broadcast pass: snapshot the registry, send one datagram per
/// descriptor per destination. A send error terminates the pass (the
/// caller's supervisor re-enters it on the next tick).
pub async fn broadcast_once(
    socket: &UdpSocket,
    registry: &ServiceRegistry,
    destinations: &[SocketAddr],
) -> Result<(), String> {
    for descriptor in registry.snapshot().await {
        let announcement = Announcement::from_descriptor(&descriptor);
        let payload = announcement.encode();
        for dest in destinations {
            socket.send_to(&payload, dest)
                .await
                .map_err(|e| format!("broadcasting {}: {e}", descriptor.uuid))?;
        }
    }
    Ok(())
}

/// Supervised broadcaster loop: sleep [`BROADCAST_INTERVAL`], run one pass,
/// repeat. Runs forever; intended to be driven by
/// [`crate::supervisor::spawn_supervised`].
pub async fn run(socket: Arc<UdpSocket>, registry: Arc<ServiceRegistry>, destinations: Vec<SocketAddr>) -> Result<(), String> {
    loop {
        tokio::time::sleep(BROADCAST_INTERVAL).await;
        broadcast_once(&socket, &registry, &destinations).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, Metadata, Provider};

    #[tokio::test]
    async fn broadcast_once_sends_one_datagram_per_descriptor_per_destination() {
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let dest = receiver.local_addr().unwrap();

        let registry = ServiceRegistry::new();
        registry.register(Descriptor {
            uuid: "svc.x".to_string(),
            provider: Provider { host: "127.0.0.1".to_string(), port: 9000 },
            tags: Default::default(),
            metadata: Metadata::default(),
        }).await.unwrap();

        broadcast_once(&sender, &registry, &[dest]).await.unwrap();

        let mut buf = [0u8; 8192];
        let (n, _) = tokio::time::timeout(Duration::from_secs(1), receiver.recv_from(&mut buf)).await.unwrap().unwrap();
        let ann = Announcement::decode(&buf[..n]).unwrap();
        assert_eq!(ann.uuid, "svc.x");
        assert_eq!(ann.port, 9000);
    }
}
