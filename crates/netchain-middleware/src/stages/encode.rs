//! Request body encoding middleware.
//!
//! Serializes a value as the JSON body of every request passing through and
//! sets `content-type: application/json`. The payload type is unchanged.
//!
//! If the value cannot be serialized the layer short-circuits: the caller
//! receives `Failure(PipelineError::Encode)` and the next stage is never
//! invoked.

use crate::middleware::Middleware;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Encodes `body` as the JSON request body.
///
/// # Example
///
/// ```
/// use netchain_middleware::stages::encode;
/// use serde_json::json;
///
/// let middleware = encode::json_body::<bytes::Bytes, _>(json!({"user": "alice"}));
/// assert_eq!(middleware.layer_names(), ["encode"]);
/// ```
pub fn json_body<T, B>(body: B) -> Middleware<T, T>
where
    T: Send + 'static,
    B: Serialize + Send + Sync + 'static,
{
    let body = Arc::new(body);
    Middleware::from_fn("encode", move |request, done, next| {
        let request_id = request.id();
        match request.with_json_body(body.as_ref()) {
            Ok(encoded) => {
                debug!(
                    request_id = %request_id,
                    bytes = encoded.body().len(),
                    "Encoded request body"
                );
                next(encoded, done);
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Request body encode failed");
                done(Err(e));
            }
        }
    })
}
