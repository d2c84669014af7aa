//! Ripper: every 2 s, evict stale entries from the remote directory
//! (§4.3 "Ripper").

use std::sync::Arc;
use std::time::Duration;

use crate::directory::RemoteDirectory;

/// §4.3 "every 2 s".
pub const RIPPER_INTERVAL: Duration = Duration::from_secs(2);

/// Supervised ripper loop: sleep [`RIPPER_INTERVAL`], sweep, repeat.
pub async fn run(directory: Arc<RemoteDirectory>) -> Result<(), String> {
    loop {
        tokio::time::sleep(RIPPER_INTERVAL).await;
        directory.evict_stale().await;
    }
}
