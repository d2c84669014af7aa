//! Persistent connection pool (§3 "Client proxy pool", §4.5 "obtain a
//! client"): `provider -> open secure-channel client`, populated only when
//! the caller requests persistence.
//!
//! Two levels of locking, per §5's "hold a lock for the shortest possible
//! window and ... not perform network I/O under a write lock": the outer
//! map lock is held only long enough to find or insert a provider's
//! connection handle; the handshake and every subsequent request/reply
//! round trip run under the per-connection lock alone, so unrelated
//! providers never block each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use middleair_crypto::LocalIdentity;
use middleair_discovery::Provider;
use middleair_wire::{Error, Schema};

use crate::connection::Connection;

/// Shared pool of persistent connections, one per `provider` (§8 invariant
/// 8: "the pool contains at most one entry per provider").
#[derive(Default)]
pub struct ConnectionPool {
    entries: Mutex<HashMap<Provider, Arc<Mutex<Option<Connection>>>>>,
}

impl ConnectionPool {
    /// Empty pool.
    pub fn new() -> Self { Self::default() }

    /// Invoke `request` against the pooled connection for `provider`,
    /// opening one (with `identity`/`credentials`) on first use. The
    /// connection stays in the pool afterward regardless of outcome —
    /// repeated calls to the same provider do not open additional sockets
    /// (§8 invariant 8).
    pub async fn invoke<Req: Schema, Resp: Schema>(
        &self,
        provider: &Provider,
        identity: LocalIdentity,
        credentials: &[u8],
        request: &Req,
    ) -> Result<Resp, Error> {
        let slot = self.slot_for(provider).await;

        let mut guard = slot.lock().await;
        if guard.is_none() {
            *guard = Some(Connection::open(provider, identity, credentials).await?);
        }
        let connection = guard.as_mut().expect("just inserted or already present");
        connection.invoke(request).await
    }

    /// Find or create the (initially empty) connection slot for
    /// `provider`, holding the map lock only for this lookup/insert.
    async fn slot_for(&self, provider: &Provider) -> Arc<Mutex<Option<Connection>>> {
        let mut guard = self.entries.lock().await;
        guard.entry(provider.clone()).or_insert_with(|| Arc::new(Mutex::new(None))).clone()
    }

    /// Drain the pool, closing every connection. Errors are collected, not
    /// fatal (§4.5 "`ClosePersistentConns()`").
    pub async fn close_all(&self) -> Vec<Error> {
        // Dropping each slot's `Connection` closes its socket; no teardown
        // step can itself fail, but the signature matches the spec's
        // "errors are collected, not fatal" in case a future transport
        // needs a graceful shutdown.
        self.entries.lock().await.clear();
        Vec::new()
    }

    /// Number of pooled entries — exposed for tests (§8 invariant 8).
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_pool_has_no_entries() {
        let pool = ConnectionPool::new();
        assert_eq!(pool.len().await, 0);
    }

    #[tokio::test]
    async fn close_all_on_empty_pool_collects_no_errors() {
        let pool = ConnectionPool::new();
        assert!(pool.close_all().await.is_empty());
        assert_eq!(pool.len().await, 0);
    }
}
