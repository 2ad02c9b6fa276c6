//! Telemetry emission middleware.
//!
//! Wraps every traversal in a `tracing` span, logs when the request starts and
//! finishes, and records metrics through the `metrics` facade. The payload type
//! is unchanged and the result is forwarded untouched.
//!
//! # Metrics Emitted
//!
//! - `netchain_requests_total` - Counter by `service` and `outcome`
//! - `netchain_request_duration_seconds` - Histogram by `service`
//! - `netchain_in_flight_requests` - Gauge by `service`
//!
//! `outcome` is `success`, the [`ErrorCategory`](netchain_core::ErrorCategory)
//! of the failure, or `dropped` when an inner stage drops the completion
//! without calling it. The in-flight gauge is decremented in every case. No
//! recorder is installed here; without one the macros are
//! no-ops.
//!
//! # Example
//!
//! ```rust
//! use netchain_middleware::stages::telemetry;
//!
//! let middleware = telemetry::middleware::<bytes::Bytes>("session-api");
//! assert_eq!(middleware.layer_names(), ["telemetry"]);
//! ```

use crate::middleware::Middleware;
use netchain_core::PipelineResult;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn, Span};

/// Counter of finished requests.
pub const REQUESTS_TOTAL: &str = "netchain_requests_total";

/// Histogram of request duration in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "netchain_request_duration_seconds";

/// Gauge of requests currently in flight.
pub const IN_FLIGHT_REQUESTS: &str = "netchain_in_flight_requests";

/// `outcome` label for a request whose completion was dropped uncalled.
pub const OUTCOME_DROPPED: &str = "dropped";

/// Holds one request in the in-flight gauge until its outcome is recorded.
///
/// Dropping the guard without `finish` records [`OUTCOME_DROPPED`].
struct InFlightGuard {
    service: Arc<str>,
    span: Span,
    started: Instant,
    recorded: bool,
}

impl InFlightGuard {
    fn start(service: Arc<str>, span: Span) -> Self {
        metrics::gauge!(IN_FLIGHT_REQUESTS, "service" => service.to_string()).increment(1.0);
        Self {
            service,
            span,
            started: Instant::now(),
            recorded: false,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn finish(mut self, outcome: &'static str) {
        self.record(outcome);
    }

    fn record(&mut self, outcome: &'static str) {
        if self.recorded {
            return;
        }
        self.recorded = true;

        let service = self.service.to_string();
        metrics::gauge!(IN_FLIGHT_REQUESTS, "service" => service.clone()).decrement(1.0);
        metrics::counter!(REQUESTS_TOTAL, "service" => service.clone(), "outcome" => outcome)
            .increment(1);
        metrics::histogram!(REQUEST_DURATION_SECONDS, "service" => service)
            .record(self.elapsed().as_secs_f64());
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.recorded {
            let span = self.span.clone();
            let _entered = span.enter();
            warn!("Request completion dropped without a result");
            self.record(OUTCOME_DROPPED);
        }
    }
}

/// Emits spans, logs and metrics for every request.
pub fn middleware<T>(service: impl Into<String>) -> Middleware<T, T>
where
    T: Send + 'static,
{
    let service: Arc<str> = Arc::from(service.into());
    Middleware::from_fn("telemetry", move |request, done, next| {
        let span = info_span!(
            "netchain.request",
            service = %service,
            request_id = %request.id(),
            http.method = %request.method(),
            http.url = %request.uri(),
        );
        let _entered = span.enter();

        let guard = InFlightGuard::start(Arc::clone(&service), span.clone());
        info!("Request started");

        next(
            request,
            Box::new(move |result: PipelineResult<T>| {
                let span = guard.span.clone();
                let _entered = span.enter();
                let duration_ms = guard.elapsed().as_secs_f64() * 1000.0;
                let outcome = match &result {
                    Ok(_) => {
                        info!(duration_ms, "Request completed");
                        "success"
                    }
                    Err(e) => {
                        let category = e.category();
                        warn!(duration_ms, error = %e, category = %category, "Request failed");
                        category.as_str()
                    }
                };
                guard.finish(outcome);

                done(result);
            }),
        );
    })
}
