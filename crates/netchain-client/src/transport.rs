//! Transports: the innermost stage of every provider.
//!
//! A [`Transport`] delivers one [`Request`] and resolves to the raw response
//! payload. It knows nothing about middleware; the provider adapts it into the
//! terminal [`StageFn`](netchain_middleware::StageFn) of a chain.

use bytes::Bytes;
use http::Uri;
use netchain_config::TransportConfig;
use netchain_core::{PipelineError, PipelineResult, Request};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Delivers a request and yields the raw response payload.
///
/// Returned futures must not borrow `self`; they are spawned onto the runtime.
pub trait Transport: Send + Sync + 'static {
    /// Sends `request`.
    fn send(&self, request: Request) -> BoxFuture<'static, PipelineResult<Bytes>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: Request) -> BoxFuture<'static, PipelineResult<Bytes>> {
        (**self).send(request)
    }
}

/// HTTP transport backed by `reqwest`.
///
/// Relative request URIs (`/session`) are joined onto the configured base
/// URL. Any non-2xx status is reported as
/// `PipelineError::Transport { status: Some(..) }`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Option<String>,
    timeout: Duration,
}

impl HttpTransport {
    /// Builds a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &TransportConfig) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| PipelineError::transport(format!("failed to create client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
        })
    }

    /// Wraps an existing `reqwest` client.
    #[must_use]
    pub fn from_client(client: Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url,
            timeout: TransportConfig::default().timeout(),
        }
    }

    /// Returns the base URL relative URIs are joined onto.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Returns the configured request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves `uri` to an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Transport` for a relative URI when no base URL
    /// is configured.
    pub fn resolve(&self, uri: &Uri) -> PipelineResult<String> {
        if uri.scheme().is_some() {
            return Ok(uri.to_string());
        }

        let base = self.base_url.as_deref().ok_or_else(|| {
            PipelineError::transport(format!("relative uri '{uri}' requires a base url"))
        })?;
        let path = uri.path_and_query().map_or("", |p| p.as_str());

        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

fn from_reqwest(err: &reqwest::Error) -> PipelineError {
    if err.is_timeout() {
        PipelineError::timeout(err.to_string())
    } else {
        PipelineError::Transport {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> BoxFuture<'static, PipelineResult<Bytes>> {
        let url = match self.resolve(request.uri()) {
            Ok(url) => url,
            Err(e) => return Box::pin(async move { Err(e) }),
        };
        let client = self.client.clone();
        let request_id = request.id();
        let (method, _uri, headers, body) = request.into_parts();

        Box::pin(async move {
            debug!(
                request_id = %request_id,
                http.method = %method,
                http.url = %url,
                "Sending request"
            );

            let response = client
                .request(method, url.as_str())
                .headers(headers)
                .body(body)
                .send()
                .await
                .map_err(|e| from_reqwest(&e))?;

            let status = response.status();
            debug!(
                request_id = %request_id,
                http.status_code = status.as_u16(),
                "Response received"
            );

            if !status.is_success() {
                return Err(PipelineError::transport_status(
                    status.as_u16(),
                    format!("upstream returned {status}"),
                ));
            }

            response.bytes().await.map_err(|e| from_reqwest(&e))
        })
    }
}

/// Transport built from an async closure.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use netchain_client::FnTransport;
///
/// let transport = FnTransport::new(|_request| async { Ok(Bytes::from_static(b"{}")) });
/// ```
pub struct FnTransport<F> {
    f: F,
}

impl<F, Fut> FnTransport<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PipelineResult<Bytes>> + Send + 'static,
{
    /// Creates a transport that calls `f` for every request.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> std::fmt::Debug for FnTransport<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransport").finish_non_exhaustive()
    }
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PipelineResult<Bytes>> + Send + 'static,
{
    fn send(&self, request: Request) -> BoxFuture<'static, PipelineResult<Bytes>> {
        Box::pin((self.f)(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base_url: Option<&str>) -> HttpTransport {
        HttpTransport::new(&TransportConfig {
            base_url: base_url.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_resolve_absolute_uri() {
        let t = transport(Some("https://api.example.com"));
        let uri: Uri = "https://other.example.com/x?y=1".parse().unwrap();
        assert_eq!(t.resolve(&uri).unwrap(), "https://other.example.com/x?y=1");
    }

    #[test]
    fn test_resolve_relative_uri() {
        let t = transport(Some("https://api.example.com/v1/"));
        let uri: Uri = "/session?fresh=true".parse().unwrap();
        assert_eq!(
            t.resolve(&uri).unwrap(),
            "https://api.example.com/v1/session?fresh=true"
        );
    }

    #[test]
    fn test_resolve_relative_without_base() {
        let t = transport(None);
        let err = t.resolve(&"/session".parse().unwrap()).unwrap_err();
        assert!(matches!(err, PipelineError::Transport { status: None, .. }));
    }

    #[test]
    fn test_config_is_applied() {
        let t = HttpTransport::new(&TransportConfig {
            timeout_ms: 1234,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(t.timeout(), Duration::from_millis(1234));
        assert!(t.base_url().is_none());
    }

    #[tokio::test]
    async fn test_send_relative_without_base_fails_fast() {
        let t = transport(None);
        let result = t.send(Request::get("/session".parse().unwrap())).await;
        assert!(matches!(result, Err(PipelineError::Transport { .. })));
    }

    #[test]
    fn test_fn_transport() {
        let t = FnTransport::new(|request: Request| async move {
            Ok(Bytes::from(request.uri().path().to_string()))
        });
        let body = tokio_test::block_on(
            t.send(Request::get("https://example.com/echo".parse().unwrap())),
        )
        .unwrap();
        assert_eq!(body, Bytes::from_static(b"/echo"));
    }

    #[tokio::test]
    async fn test_arc_transport() {
        let t: Arc<dyn Transport> =
            Arc::new(FnTransport::new(|_request| async { Ok(Bytes::from_static(b"ok")) }));
        let body = t.send(Request::get("https://example.com".parse().unwrap())).await;
        assert_eq!(body.unwrap(), Bytes::from_static(b"ok"));
    }
}
