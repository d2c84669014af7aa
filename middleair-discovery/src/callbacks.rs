//! Callback registry (§3, §9 "Callback registry keyed by function
//! identity"): reimplemented as an opaque token handed back on
//! registration rather than pointer-to-value identity.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::announcement::Announcement;

/// Invoked once per received announcement, with the datagram's source
/// address and the parsed announcement.
pub type Callback = Arc<dyn Fn(SocketAddr, &Announcement) + Send + Sync>;

/// Opaque subscription token returned by [`CallbackRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

#[derive(Default)]
struct Inner {
    next_id: u64,
    subscribers: Vec<(SubscriptionToken, Callback)>,
}

/// Unordered set of subscribers invoked on every received announcement.
#[derive(Default)]
pub struct CallbackRegistry {
    inner: RwLock<Inner>,
}

impl CallbackRegistry {
    /// Empty registry.
    pub fn new() -> Self { Self::default() }

    /// Register `callback`; returns a token to unsubscribe later.
    pub async fn subscribe(&self, callback: Callback) -> SubscriptionToken {
        let mut guard = self.inner.write().await;
        guard.next_id += 1;
        let token = SubscriptionToken(guard.next_id);
        guard.subscribers.push((token, callback));
        token
    }

    /// Remove a previously registered callback.
    pub async fn unsubscribe(&self, token: SubscriptionToken) {
        let mut guard = self.inner.write().await;
        guard.subscribers.retain(|(t, _)| *t != token);
    }

    /// Invoke every subscriber with `(source_addr, announcement)`
    /// (§4.3 "Listener"). A snapshot is taken before invocation so a
    /// callback cannot deadlock by re-entering `subscribe`/`unsubscribe`.
    pub async fn notify(&self, source: SocketAddr, announcement: &Announcement) {
        let subscribers = { self.inner.read().await.subscribers.clone() };
        for (_, callback) in subscribers {
            callback(source, announcement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> Announcement {
        Announcement { uuid: "svc.x".to_string(), port: 9000, tags: Default::default() }
    }

    #[tokio::test]
    async fn subscriber_is_invoked_on_notify() {
        let registry = CallbackRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        registry.subscribe(Arc::new(move |_addr, _ann| { count2.fetch_add(1, Ordering::SeqCst); })).await;

        registry.notify("127.0.0.1:1".parse().unwrap(), &sample()).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsubscribed_callback_is_not_invoked() {
        let registry = CallbackRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        let token = registry.subscribe(Arc::new(move |_addr, _ann| { count2.fetch_add(1, Ordering::SeqCst); })).await;
        registry.unsubscribe(token).await;

        registry.notify("127.0.0.1:1".parse().unwrap(), &sample()).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
