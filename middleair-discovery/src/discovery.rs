//! Facade: wires the broadcaster, listener, and ripper to shared state and
//! drives the HELO self-announcement bootstrap (§4.3 "Self-announcement
//! special case").

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::broadcaster;
use crate::callbacks::CallbackRegistry;
use crate::directory::RemoteDirectory;
use crate::listener;
use crate::registry::{RegistrationHandle, ServiceRegistry};
use crate::ripper;
use crate::supervisor::spawn_supervised;
use crate::descriptor::{Descriptor, Metadata, Provider};

/// §4.3: the bootstrap service uuid used to learn our own externally
/// visible address.
pub const HELO_UUID: &str = "HELO";

/// Discovery state shared by every task, plus a handle to the bootstrap
/// HELO registration and the externally-visible address it resolves.
pub struct Discovery {
    directory: Arc<RemoteDirectory>,
    registry: Arc<ServiceRegistry>,
    callbacks: Arc<CallbackRegistry>,
    observed_self_host: Arc<RwLock<Option<String>>>,
    helo_resolved: Arc<AtomicBool>,
}

impl Discovery {
    /// Build discovery state and register the HELO bootstrap service on
    /// `port`.
    pub async fn new(port: u16) -> Self {
        let discovery = Self {
            directory: Arc::new(RemoteDirectory::new()),
            registry: Arc::new(ServiceRegistry::new()),
            callbacks: Arc::new(CallbackRegistry::new()),
            observed_self_host: Arc::new(RwLock::new(None)),
            helo_resolved: Arc::new(AtomicBool::new(false)),
        };

        let helo_handle = discovery.registry.register(Descriptor {
            uuid: HELO_UUID.to_string(),
            provider: Provider { host: String::new(), port },
            tags: Default::default(),
            metadata: Metadata::from_env(),
        }).await.expect("HELO descriptor fields are always within the length cap");

        discovery.install_helo_callback(helo_handle).await;
        discovery
    }

    async fn install_helo_callback(&self, helo_handle: RegistrationHandle) {
        let observed = self.observed_self_host.clone();
        let resolved = self.helo_resolved.clone();
        let registry = self.registry.clone();

        self.callbacks.subscribe(Arc::new(move |source: SocketAddr, announcement| {
            if announcement.uuid != HELO_UUID {
                return;
            }
            if resolved.swap(true, Ordering::SeqCst) {
                return;
            }
            let observed = observed.clone();
            let registry = registry.clone();
            let host = source.ip().to_string();
            tokio::spawn(async move {
                *observed.write().await = Some(host);
                registry.unregister(helo_handle).await;
            });
        })).await;
    }

    /// The externally-visible address learned from our own HELO echo, if
    /// any has arrived yet.
    pub async fn observed_self_host(&self) -> Option<String> {
        self.observed_self_host.read().await.clone()
    }

    /// Shared remote directory (read access for the client proxy).
    pub fn directory(&self) -> Arc<RemoteDirectory> { self.directory.clone() }

    /// Shared registered-services table (mutated by `register`/`unregister`).
    pub fn registry(&self) -> Arc<ServiceRegistry> { self.registry.clone() }

    /// Shared callback registry.
    pub fn callbacks(&self) -> Arc<CallbackRegistry> { self.callbacks.clone() }

    /// Spawn the three supervised long-running tasks (broadcaster,
    /// listener, ripper) against a bound multicast socket. Each is
    /// restarted independently on failure (§4.3 "Supervisor behavior").
    pub fn spawn_tasks(&self, socket: Arc<tokio::net::UdpSocket>, destinations: Vec<SocketAddr>) {
        let registry = self.registry.clone();
        let broadcast_socket = socket.clone();
        tokio::spawn(spawn_supervised("discovery-broadcaster", move || {
            let registry = registry.clone();
            let socket = broadcast_socket.clone();
            let destinations = destinations.clone();
            async move { broadcaster::run(socket, registry, destinations).await }
        }));

        let directory = self.directory.clone();
        let callbacks = self.callbacks.clone();
        let listen_socket = socket.clone();
        tokio::spawn(spawn_supervised("discovery-listener", move || {
            let directory = directory.clone();
            let callbacks = callbacks.clone();
            let socket = listen_socket.clone();
            async move { listener::run(socket, directory, callbacks).await }
        }));

        let directory = self.directory.clone();
        tokio::spawn(spawn_supervised("discovery-ripper", move || {
            let directory = directory.clone();
            async move { ripper::run(directory).await }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcement::Announcement;

    #[tokio::test]
    async fn helo_echo_resolves_self_host_and_unregisters_bootstrap() {
        let discovery = Discovery::new(9000).await;
        assert_eq!(discovery.registry().snapshot().await.len(), 1);

        let helo = Announcement { uuid: HELO_UUID.to_string(), port: 9000, tags: Default::default() };
        discovery.callbacks().notify("203.0.113.4:1".parse().unwrap(), &helo).await;

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(discovery.observed_self_host().await, Some("203.0.113.4".to_string()));
        assert!(discovery.registry().snapshot().await.is_empty());
    }
}
