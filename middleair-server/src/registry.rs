//! `ServerProxy`: a caller-built registry of `{uuid, tags, handler}`
//! entries dispatched by [`crate::invoker::Invoker`] (§4.4).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use middleair_wire::{Envelope, Schema};

/// Outcome of a handler invocation (§4.4 "Loop()").
pub enum ServerError {
    /// The handler itself faulted — the library reports this as a `{code:
    /// 500}` error envelope and continues the loop.
    Fault(String),
    /// The handler deliberately declined the request with a structured
    /// error — marshaled as-is, matching "if the response itself is an
    /// error envelope, marshal it as-is".
    Declined {
        /// Application error code.
        code: i32,
        /// Human-readable message.
        message: String,
    },
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Envelope, ServerError>> + Send>>;

/// Type-erased handler: takes the already-decoded request envelope,
/// returns the response envelope to send.
pub type BoxedHandler = Arc<dyn Fn(Envelope) -> HandlerFuture + Send + Sync>;

/// One registered service: its discovery identity plus its handler.
pub struct RegistryEntry {
    /// Service uuid — also the schema type-identifier matched against
    /// `envelope.type_name` during dispatch.
    pub uuid: String,
    /// Tags advertised to discovery.
    pub tags: Vec<String>,
    pub(crate) handler: BoxedHandler,
}

/// Caller-built registry handed to [`crate::invoker::Invoker::new`].
#[derive(Default)]
pub struct ServerProxy {
    entries: Vec<RegistryEntry>,
}

impl ServerProxy {
    /// Empty registry.
    pub fn new() -> Self { Self::default() }

    /// Register a handler for request schema `Req` producing response
    /// schema `Resp`. `handler` decodes nothing itself — the framework
    /// decodes `envelope.message_data` into `Req` before calling it and
    /// encodes the returned `Resp` before sending.
    pub fn register<Req, Resp, F, Fut>(&mut self, uuid: impl Into<String>, tags: Vec<String>, handler: F)
    where
        Req: Schema + Send + 'static,
        Resp: Schema + Send + 'static,
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, ServerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let boxed: BoxedHandler = Arc::new(move |envelope: Envelope| {
            let handler = handler.clone();
            Box::pin(async move {
                let request: Req = envelope
                    .unpack()
                    .map_err(|e| ServerError::Fault(format!("decoding request: {e}")))?;
                let response = handler(request).await?;
                Ok(Envelope::pack(&response))
            })
        });
        self.entries.push(RegistryEntry { uuid: uuid.into(), tags, handler: boxed });
    }

    /// Find the entry whose `uuid` matches `type_name` (§4.4 "locate the
    /// registry entry whose declared type string equals
    /// `envelope.type_identifier`").
    pub fn find(&self, type_name: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.uuid == type_name)
    }

    /// Every registered entry, in registration order — consumed once at
    /// invoker construction to populate discovery (§4.4 point 2).
    pub fn entries(&self) -> &[RegistryEntry] { &self.entries }
}
