//! Process-wide listener registry (§4.4 point 1, §9 "Shared listener
//! reference-count"): at most one bound [`TcpListener`] per port, shared
//! through an intrusive refcount; the listener closes when the count
//! returns to zero.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tokio::net::TcpListener;

struct Slot {
    listener: Arc<TcpListener>,
    refcount: usize,
}

fn registry() -> &'static Mutex<HashMap<u16, Slot>> {
    static REGISTRY: OnceLock<Mutex<HashMap<u16, Slot>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// A reference-counted handle to a shared listener on one port. Dropping
/// the last handle on a port closes it.
pub struct SharedListener {
    port: u16,
    listener: Arc<TcpListener>,
}

impl SharedListener {
    /// Bind (or join) the listener for `port`. The first caller on a port
    /// creates it; later callers share it through the refcount.
    pub async fn acquire(port: u16) -> Result<Self, std::io::Error> {
        if let Some(listener) = Self::try_join(port) {
            return Ok(Self { port, listener });
        }

        // Binding is async and must not happen while holding the std mutex.
        match TcpListener::bind(("0.0.0.0", port)).await {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                // Key on the bound port, not the requested one: port 0 asks
                // the OS to assign one, and the assigned port is what every
                // later acquire()/refcount() call looks up by.
                let bound = fresh.local_addr()?.port();
                let mut guard = registry().lock().unwrap();
                let slot = guard.entry(bound).or_insert_with(|| Slot { listener: fresh.clone(), refcount: 0 });
                slot.refcount += 1;
                Ok(Self { port: bound, listener: slot.listener.clone() })
            }
            // Another task won the bind race between our try_join and here;
            // its slot is already registered under `port`, so join it.
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                Self::try_join(port).map(|listener| Self { port, listener }).ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    fn try_join(port: u16) -> Option<Arc<TcpListener>> {
        let mut guard = registry().lock().unwrap();
        let slot = guard.get_mut(&port)?;
        slot.refcount += 1;
        Some(slot.listener.clone())
    }

    /// The shared socket.
    pub fn listener(&self) -> &TcpListener { &self.listener }

    /// Current refcount on `port` — exposed for tests (§8 invariant 9).
    pub fn refcount(port: u16) -> usize {
        registry().lock().unwrap().get(&port).map(|s| s.refcount).unwrap_or(0)
    }
}

impl Drop for SharedListener {
    fn drop(&mut self) {
        let mut guard = registry().lock().unwrap();
        if let Some(slot) = guard.get_mut(&self.port) {
            slot.refcount -= 1;
            if slot.refcount == 0 {
                guard.remove(&self.port);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_shares_and_drop_releases_refcount() {
        let first = SharedListener::acquire(0).await.unwrap();
        let port = first.listener().local_addr().unwrap().port();
        assert_eq!(SharedListener::refcount(port), 1);

        let second = SharedListener::acquire(port).await.unwrap();
        assert_eq!(SharedListener::refcount(port), 2);
        assert!(Arc::ptr_eq(&first.listener, &second.listener));

        drop(second);
        assert_eq!(SharedListener::refcount(port), 1);
        drop(first);
        assert_eq!(SharedListener::refcount(port), 0);
    }
}
