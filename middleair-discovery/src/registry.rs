//! Registered-services table (§3): the set of local descriptors the
//! broadcaster advertises, mutated only through `register`/`unregister`.

use tokio::sync::RwLock;

use middleair_wire::Error;

use crate::descriptor::Descriptor;

/// Opaque handle returned by [`ServiceRegistry::register`], used to
/// deregister without the caller needing to reconstruct the descriptor
/// (§9 "Cyclic ownership risk": the registry owns the descriptor, callers
/// hold handles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationHandle(u64);

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<(RegistrationHandle, Descriptor)>,
}

/// Shared, reader/writer-locked set of locally registered descriptors.
#[derive(Default)]
pub struct ServiceRegistry {
    inner: RwLock<Inner>,
}

impl ServiceRegistry {
    /// Empty registry.
    pub fn new() -> Self { Self::default() }

    /// Validate and add a descriptor; returns the handle to unregister it
    /// later.
    pub async fn register(&self, descriptor: Descriptor) -> Result<RegistrationHandle, Error> {
        descriptor.validate()?;
        let mut guard = self.inner.write().await;
        guard.next_id += 1;
        let handle = RegistrationHandle(guard.next_id);
        guard.entries.push((handle, descriptor));
        Ok(handle)
    }

    /// Remove the descriptor associated with `handle`, if still present.
    pub async fn unregister(&self, handle: RegistrationHandle) {
        let mut guard = self.inner.write().await;
        guard.entries.retain(|(h, _)| *h != handle);
    }

    /// Snapshot of every currently registered descriptor — consumed once
    /// per broadcast pass (§4.3 "Broadcaster"). Iteration order is not a
    /// contract (§9 "Nondeterministic iteration").
    pub async fn snapshot(&self) -> Vec<Descriptor> {
        let guard = self.inner.read().await;
        guard.entries.iter().map(|(_, d)| d.clone()).collect()
    }
}
