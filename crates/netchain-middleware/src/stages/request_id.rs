//! Request ID propagation middleware.
//!
//! Attaches the request's [`RequestId`](netchain_core::RequestId) as the
//! `X-Request-ID` header so the upstream service can correlate its logs with
//! ours. The payload type is unchanged.
//!
//! ## Existing headers
//!
//! 1. **Keep** (default): an `X-Request-ID` already on the request is left alone
//! 2. **Overwrite**: the header is always replaced with the request's own ID

use crate::middleware::Middleware;
use http::header::{HeaderName, HeaderValue};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Attaches `X-Request-ID`, keeping a value the caller already set.
pub fn middleware<T>() -> Middleware<T, T>
where
    T: Send + 'static,
{
    build(false)
}

/// Attaches `X-Request-ID`, replacing any value the caller set.
pub fn overwrite<T>() -> Middleware<T, T>
where
    T: Send + 'static,
{
    build(true)
}

fn build<T>(overwrite: bool) -> Middleware<T, T>
where
    T: Send + 'static,
{
    Middleware::from_fn("request_id", move |request, done, next| {
        if !overwrite && request.headers().contains_key(REQUEST_ID_HEADER) {
            next(request, done);
            return;
        }

        // A hyphenated UUID is always a valid header value.
        let value = HeaderValue::from_str(&request.id().to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("invalid"));
        next(
            request.with_header(HeaderName::from_static(REQUEST_ID_HEADER), value),
            done,
        );
    })
}
