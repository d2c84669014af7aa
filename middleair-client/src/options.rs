//! Client call options (§4.5).

/// Per-call (or per-client) options controlling resolution, tag
/// filtering, pooling, and dispatch strategy.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Tags the caller requires candidates to carry.
    pub tags: Vec<String>,
    /// All-match (`true`) vs any-match (`false`) tag filtering.
    pub strict_match: bool,
    /// `true`: attempt every passing candidate, succeed if any succeeds.
    /// `false` (default): first-success, trying candidates in order.
    pub broadcast: bool,
    /// `true`: reuse a pooled connection per provider. `false`: open
    /// fresh and close immediately after the call.
    pub persistent: bool,
    /// Credential blob submitted during the post-handshake credential
    /// sub-handshake (§4.2).
    pub credentials: Vec<u8>,
}
