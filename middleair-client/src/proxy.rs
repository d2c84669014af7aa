//! Client proxy (§4.5): resolve a service via discovery, select providers,
//! open or reuse a secure channel, dispatch the request, and return the
//! decoded response.

use std::sync::Arc;

use middleair_crypto::LocalIdentity;
use middleair_discovery::{Descriptor, RemoteDirectory};
use middleair_wire::{Error, Schema};

use crate::connection::Connection;
use crate::errors::InvokeError;
use crate::options::Options;
use crate::pool::ConnectionPool;
use crate::tagfilter;

/// Resolves and invokes services discovered over the [`RemoteDirectory`],
/// reusing persistent connections through a shared [`ConnectionPool`].
pub struct ClientProxy {
    directory: Arc<RemoteDirectory>,
    pool: Arc<ConnectionPool>,
}

impl ClientProxy {
    /// Build a proxy over the discovery directory it resolves services
    /// from.
    pub fn new(directory: Arc<RemoteDirectory>) -> Self {
        Self { directory, pool: Arc::new(ConnectionPool::new()) }
    }

    /// §4.5 full path: resolve `Req::type_name()`, apply the tag filter,
    /// obtain a client per candidate, and dispatch per `options.broadcast`.
    pub async fn invoke<Req, Resp>(&self, request: &Req, options: &Options) -> Result<Resp, InvokeError>
    where
        Req: Schema,
        Resp: Schema,
    {
        let candidates = self.directory.resolve(Req::type_name()).await;
        if candidates.is_empty() {
            return Err(InvokeError::NotFound);
        }

        let candidates: Vec<Descriptor> = candidates
            .into_iter()
            .filter(|d| tagfilter::matches(d, &options.tags, options.strict_match))
            .collect();
        if candidates.is_empty() {
            return Err(InvokeError::NotFound);
        }

        if options.broadcast {
            self.dispatch_broadcast(&candidates, request, options).await
        } else {
            self.dispatch_first_success(&candidates, request, options).await
        }
    }

    /// `Broadcast=false` (default): try candidates in order, returning the
    /// first success; errors are logged and the next candidate tried.
    async fn dispatch_first_success<Req, Resp>(
        &self,
        candidates: &[Descriptor],
        request: &Req,
        options: &Options,
    ) -> Result<Resp, InvokeError>
    where
        Req: Schema,
        Resp: Schema,
    {
        for descriptor in candidates {
            match self.invoke_one(descriptor, request, options).await {
                Ok(response) => return Ok(response),
                Err(e) => tracing::warn!(provider = %descriptor.provider.host, error = %e, "candidate invocation failed"),
            }
        }
        Err(InvokeError::ServiceUnavailable)
    }

    /// `Broadcast=true`: attempt every candidate; return the first success
    /// encountered, or `ServiceUnavailable` if none succeeded (§4.5, S6).
    async fn dispatch_broadcast<Req, Resp>(
        &self,
        candidates: &[Descriptor],
        request: &Req,
        options: &Options,
    ) -> Result<Resp, InvokeError>
    where
        Req: Schema,
        Resp: Schema,
    {
        let mut success = None;
        for descriptor in candidates {
            match self.invoke_one(descriptor, request, options).await {
                Ok(response) if success.is_none() => success = Some(response),
                Ok(_) => {}
                Err(e) => tracing::warn!(provider = %descriptor.provider.host, error = %e, "candidate invocation failed"),
            }
        }
        success.ok_or(InvokeError::ServiceUnavailable)
    }

    /// §4.5 "obtain a client": a persistent call routes through the shared
    /// pool (at most one socket per provider, §8 invariant 8); a
    /// non-persistent call opens fresh and closes immediately after.
    async fn invoke_one<Req, Resp>(&self, descriptor: &Descriptor, request: &Req, options: &Options) -> Result<Resp, Error>
    where
        Req: Schema,
        Resp: Schema,
    {
        if options.persistent {
            self.pool
                .invoke(&descriptor.provider, LocalIdentity::from_env_or_generate()?, &options.credentials, request)
                .await
        } else {
            let mut connection = Connection::open(
                &descriptor.provider,
                LocalIdentity::from_env_or_generate()?,
                &options.credentials,
            )
            .await?;
            connection.invoke(request).await
        }
    }

    /// `ClosePersistentConns()` (§4.5): drain the pool; errors are
    /// collected, not fatal.
    pub async fn close_persistent_conns(&self) -> Vec<Error> {
        self.pool.close_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use middleair_discovery::{Metadata, Provider};

    struct Echo(u32);
    impl Schema for Echo {
        fn type_name() -> &'static str { "test.Echo" }
        fn encode(&self) -> Vec<u8> { self.0.to_le_bytes().to_vec() }
        fn decode(bytes: &[u8]) -> Result<Self, Error> {
            Ok(Echo(u32::from_le_bytes(bytes.try_into().map_err(|_| Error::Codec("bad echo".into()))?)))
        }
    }

    #[tokio::test]
    async fn empty_directory_is_not_found() {
        let directory = Arc::new(RemoteDirectory::new());
        let proxy = ClientProxy::new(directory);
        let result = proxy.invoke::<Echo, Echo>(&Echo(1), &Options::default()).await;
        assert!(matches!(result, Err(InvokeError::NotFound)));
    }

    /// S7 — tag filter strict: candidates exist but none pass the filter,
    /// which surfaces as `NotFound` rather than attempting a connection.
    #[tokio::test]
    async fn tag_filtered_out_candidates_are_not_found() {
        let directory = Arc::new(RemoteDirectory::new());
        directory.observe(Descriptor {
            uuid: "test.Echo".to_string(),
            provider: Provider { host: "127.0.0.1".to_string(), port: 9000 },
            tags: Default::default(),
            metadata: Metadata::default(),
        }).await;

        let proxy = ClientProxy::new(directory);
        let options = Options { tags: vec!["gpu".to_string()], strict_match: true, ..Default::default() };
        let result = proxy.invoke::<Echo, Echo>(&Echo(1), &options).await;
        assert!(matches!(result, Err(InvokeError::NotFound)));
    }
}
