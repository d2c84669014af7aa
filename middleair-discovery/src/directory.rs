//! Remote directory: `uuid -> {(descriptor, last_seen)}` with a 2-s
//! freshness window (§3 "Remote directory", §4.3 "Ripper").

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::descriptor::Descriptor;

/// §3, §4.3: an un-refreshed descriptor is evicted after this long.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
struct Entry {
    descriptor: Descriptor,
    last_seen: Instant,
}

/// Shared, reader/writer-locked table of remote descriptors (§5 "Shared
/// state and mutation discipline").
#[derive(Default)]
pub struct RemoteDirectory {
    entries: RwLock<HashMap<String, Vec<Entry>>>,
}

impl RemoteDirectory {
    /// Empty directory.
    pub fn new() -> Self { Self { entries: RwLock::new(HashMap::new()) } }

    /// Insert or refresh `(uuid, descriptor, now)` (§4.3 "Listener").
    pub async fn observe(&self, descriptor: Descriptor) {
        let now = Instant::now();
        let mut guard = self.entries.write().await;
        let bucket = guard.entry(descriptor.uuid.clone()).or_default();
        if let Some(existing) = bucket.iter_mut().find(|e| e.descriptor == descriptor) {
            existing.last_seen = now;
        } else {
            bucket.push(Entry { descriptor, last_seen: now });
        }
    }

    /// All live descriptors for `uuid` (§4.5 "Resolution").
    pub async fn resolve(&self, uuid: &str) -> Vec<Descriptor> {
        let guard = self.entries.read().await;
        guard
            .get(uuid)
            .map(|bucket| bucket.iter().map(|e| e.descriptor.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of live entries for `uuid` — used by tests and by the HELO
    /// bootstrap to check liveness without cloning descriptors.
    pub async fn count(&self, uuid: &str) -> usize {
        let guard = self.entries.read().await;
        guard.get(uuid).map(Vec::len).unwrap_or(0)
    }

    /// One ripper pass (§4.3 "Ripper"): evict entries older than
    /// [`FRESHNESS_WINDOW`]; drop any `uuid` key whose bucket becomes empty.
    pub async fn evict_stale(&self) {
        let now = Instant::now();
        let mut guard = self.entries.write().await;
        guard.retain(|_, bucket| {
            bucket.retain(|e| now.duration_since(e.last_seen) < FRESHNESS_WINDOW);
            !bucket.is_empty()
        });
    }
}
