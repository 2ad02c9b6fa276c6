//! Payload decoding middleware.
//!
//! Turns the raw transport payload into a typed value on the way back to the
//! caller. A payload that does not match the target type produces
//! `Failure(PipelineError::Decode)`; it never panics. A failure coming up from
//! below is passed through and the decoder is not invoked.
//!
//! # Example
//!
//! ```
//! use netchain_middleware::stages::decode;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Session {
//!     token: String,
//! }
//!
//! let middleware = decode::json::<Session>();
//! assert_eq!(middleware.layer_names(), ["decode"]);
//! ```

use crate::middleware::Middleware;
use bytes::Bytes;
use netchain_core::{DecodeError, PipelineError, PipelineResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decodes a JSON payload into `T` with `serde_json`.
pub fn json<T>() -> Middleware<Bytes, T>
where
    T: DeserializeOwned + Send + 'static,
{
    let type_name = short_type_name::<T>();
    with_decoder("decode", move |raw: &Bytes| {
        serde_json::from_slice::<T>(raw).map_err(|e| DecodeError::from_json(type_name, &e))
    })
}

/// Decodes the payload with any decoder function.
///
/// The decoder is only called for successful payloads.
pub fn with_decoder<T, F>(name: &'static str, decoder: F) -> Middleware<Bytes, T>
where
    T: Send + 'static,
    F: Fn(&Bytes) -> Result<T, DecodeError> + Send + Sync + 'static,
{
    let decoder = Arc::new(decoder);
    Middleware::from_fn(name, move |request, done, next| {
        let decoder = Arc::clone(&decoder);
        let request_id = request.id();
        next(
            request,
            Box::new(move |result: PipelineResult<Bytes>| {
                let decoded = result.and_then(|raw| {
                    debug!(request_id = %request_id, bytes = raw.len(), "Decoding payload");
                    decoder(&raw).map_err(|e| {
                        warn!(request_id = %request_id, error = %e, "Payload decode failed");
                        PipelineError::Decode(e)
                    })
                });
                done(decoded);
            }),
        );
    })
}

/// Returns the last path segment of `T`'s type name.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
