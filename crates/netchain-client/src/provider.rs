//! The request provider.
//!
//! A [`Provider<R>`] binds a `Middleware<Bytes, R>` chain to a [`Transport`].
//! Each call to [`Provider::request`] applies the chain to a terminal stage
//! that hands the request to the transport, then runs the resulting stage with
//! the caller's completion:
//!
//! ```text
//! request(req, done) == middleware.apply(transport_stage)(req, done)
//! ```
//!
//! The transport's future is spawned onto the current Tokio runtime, so the
//! completion is invoked from a runtime worker. [`Provider::send`] wraps the
//! callback API in a future for async callers.

use crate::transport::{HttpTransport, Transport};
use bytes::Bytes;
use netchain_config::NetchainConfig;
use netchain_core::{Completion, PipelineError, PipelineResult, Request};
use netchain_middleware::stages::{signing, telemetry, Sha256Signer};
use netchain_middleware::{stage, Middleware, StageFn};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A middleware chain bound to a transport.
///
/// Providers are cheap to clone and safe to share across tasks. Concurrent
/// requests never share per-request state.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use netchain_client::{FnTransport, Provider};
/// use netchain_middleware::Middleware;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let length: Middleware<Bytes, usize> =
///     Middleware::map_result("length", |result| result.map(|raw: Bytes| raw.len()));
/// let transport = FnTransport::new(|_request| async { Ok(Bytes::from_static(b"hello")) });
///
/// let provider = Provider::new(length, transport);
/// let len = provider
///     .send(netchain_core::Request::get("https://example.com".parse().unwrap()))
///     .await
///     .unwrap();
/// assert_eq!(len, 5);
/// # }
/// ```
pub struct Provider<R> {
    middleware: Middleware<Bytes, R>,
    transport: Arc<dyn Transport>,
    pipeline: StageFn<R>,
}

impl<R> Clone for Provider<R> {
    fn clone(&self) -> Self {
        Self {
            middleware: self.middleware.clone(),
            transport: Arc::clone(&self.transport),
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl<R: Send + 'static> fmt::Debug for Provider<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("layers", &self.middleware.layer_names())
            .finish_non_exhaustive()
    }
}

impl<R> Provider<R>
where
    R: Send + 'static,
{
    /// Binds `middleware` to `transport`.
    pub fn new(middleware: Middleware<Bytes, R>, transport: impl Transport) -> Self {
        Self::with_shared_transport(middleware, Arc::new(transport))
    }

    /// Binds `middleware` to a transport shared with other providers.
    pub fn with_shared_transport(
        middleware: Middleware<Bytes, R>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let pipeline = middleware.apply(transport_stage(Arc::clone(&transport)));
        Self {
            middleware,
            transport,
            pipeline,
        }
    }

    /// Builds a provider over an [`HttpTransport`] from configuration.
    ///
    /// The chain actually run is
    /// `telemetry(service_name).with(middleware).with(signing)`: the
    /// telemetry stage is outermost, and the signing stage is added innermost
    /// only when `signing.enabled` is set.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Transport` if the HTTP client cannot be built,
    /// or `PipelineError::Signature` if signing is enabled with no secret or
    /// an invalid header name.
    pub fn from_config(
        middleware: Middleware<Bytes, R>,
        config: &NetchainConfig,
    ) -> PipelineResult<Self> {
        let transport = HttpTransport::new(&config.transport)?;

        let mut chain = telemetry::middleware::<R>(config.service_name.as_str()).with(&middleware);
        if config.signing.enabled {
            let secret = config
                .signing
                .secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| PipelineError::signature("signing enabled without a secret"))?;
            let signer = Sha256Signer::new(secret).with_header_name(&config.signing.header)?;
            chain = chain.with(&signing::middleware(signer));
        }

        debug!(layers = ?chain.layer_names(), "Provider configured");
        Ok(Self::new(chain, transport))
    }

    /// Runs `request` through the chain and the transport.
    ///
    /// `completion` is invoked at most once with the final result. Failures
    /// are delivered through it as well; this method never panics on a
    /// pipeline error.
    pub fn request(&self, request: Request, completion: Completion<R>) {
        (self.pipeline)(request, completion);
    }

    /// Runs `request` and waits for its result.
    ///
    /// If the chain drops the completion without calling it, the result is
    /// `PipelineError::Runtime`.
    pub async fn send(&self, request: Request) -> PipelineResult<R> {
        let (tx, rx) = oneshot::channel();
        self.request(
            request,
            Box::new(move |result: PipelineResult<R>| {
                // The receiver is gone only if the caller stopped waiting.
                let _ = tx.send(result);
            }),
        );

        rx.await.unwrap_or_else(|_| {
            Err(PipelineError::runtime(
                "pipeline dropped the completion without a result",
            ))
        })
    }

    /// Returns the chain's layer names, outermost first.
    pub fn layer_names(&self) -> &[&'static str] {
        self.middleware.layer_names()
    }

    /// Returns the middleware chain.
    pub const fn middleware(&self) -> &Middleware<Bytes, R> {
        &self.middleware
    }
}

/// Adapts a transport into the terminal stage of a chain.
fn transport_stage(transport: Arc<dyn Transport>) -> StageFn<Bytes> {
    stage(move |request: Request, done: Completion<Bytes>| {
        let request_id = request.id();
        match Handle::try_current() {
            Ok(handle) => {
                let send = transport.send(request);
                handle.spawn(async move {
                    let result = send.await;
                    debug!(request_id = %request_id, ok = result.is_ok(), "Transport finished");
                    done(result);
                });
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "No runtime to drive the transport");
                done(Err(PipelineError::runtime(format!(
                    "no Tokio runtime available: {e}"
                ))));
            }
        }
    })
}
