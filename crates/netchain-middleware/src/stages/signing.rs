//! Request signing middleware.
//!
//! Signs every outbound request before it reaches the transport and gives the
//! [`Signer`] a chance to open (verify or unwrap) the raw response payload on
//! the way back. Both sides operate on raw bytes, so this layer sits between
//! the transport and any decode layer.
//!
//! Signing produces a new [`Request`]; the request passed in is never modified.
//! Opening only runs for successful payloads. A transport failure passes
//! through untouched.
//!
//! ## Signature scheme
//!
//! [`Sha256Signer`] attaches two headers:
//!
//! | Header                  | Value                                              |
//! |-------------------------|----------------------------------------------------|
//! | `x-signature-timestamp` | Unix seconds at signing time                       |
//! | `x-content-signature`   | base64url(SHA-256(secret, method, uri, ts, body))  |
//!
//! Fields are joined with `\n` before hashing.

use crate::middleware::Middleware;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use netchain_core::{PipelineError, PipelineResult, Request};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

/// Default header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-content-signature";

/// Header carrying the signing timestamp.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Signs requests and opens responses.
pub trait Signer: Send + Sync + 'static {
    /// Returns a signed copy of `request`.
    fn sign(&self, request: Request) -> PipelineResult<Request>;

    /// Verifies or unwraps a successful response payload.
    ///
    /// The default implementation returns the payload unchanged.
    fn open(&self, payload: Bytes) -> PipelineResult<Bytes> {
        Ok(payload)
    }
}

/// Keyed SHA-256 request signer.
///
/// # Example
///
/// ```
/// use netchain_middleware::stages::signing::{Sha256Signer, Signer, SIGNATURE_HEADER};
/// use netchain_core::Request;
///
/// let signer = Sha256Signer::new(b"shared-secret");
/// let request = Request::get("https://api.example.com/session".parse().unwrap());
///
/// let signed = signer.sign(request).unwrap();
/// assert!(signed.headers().contains_key(SIGNATURE_HEADER));
/// assert!(signer.verify(&signed).is_ok());
/// ```
#[derive(Clone)]
pub struct Sha256Signer {
    secret: Vec<u8>,
    header: HeaderName,
}

impl std::fmt::Debug for Sha256Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256Signer")
            .field("secret", &"<redacted>")
            .field("header", &self.header)
            .finish()
    }
}

impl Sha256Signer {
    /// Creates a signer for `secret` using the default header.
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            header: HeaderName::from_static(SIGNATURE_HEADER),
        }
    }

    /// Uses `name` as the signature header instead of the default.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Signature` if `name` is not a valid header name.
    pub fn with_header_name(mut self, name: &str) -> PipelineResult<Self> {
        self.header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PipelineError::signature(format!("invalid header name '{name}': {e}")))?;
        Ok(self)
    }

    /// Returns the header the signature is written to.
    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.header
    }

    /// Computes the signature for the given request parts.
    #[must_use]
    pub fn signature(&self, request: &Request, timestamp: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(b"\n");
        hasher.update(request.method().as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(request.uri().to_string().as_bytes());
        hasher.update(b"\n");
        hasher.update(timestamp.to_string().as_bytes());
        hasher.update(b"\n");
        hasher.update(request.body());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Checks the signature headers of a signed request.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Signature` if a header is missing or the
    /// signature does not match.
    pub fn verify(&self, request: &Request) -> PipelineResult<()> {
        let timestamp = request
            .headers()
            .get(TIMESTAMP_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| PipelineError::signature("missing or invalid signature timestamp"))?;
        let provided = request
            .headers()
            .get(&self.header)
            .ok_or_else(|| PipelineError::signature("missing signature"))?;

        let expected = self.signature(request, timestamp);
        if bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
            Ok(())
        } else {
            Err(PipelineError::signature("signature mismatch"))
        }
    }
}

impl Signer for Sha256Signer {
    fn sign(&self, request: Request) -> PipelineResult<Request> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.signature(&request, timestamp);
        let signature = HeaderValue::from_str(&signature)
            .map_err(|e| PipelineError::signature(e.to_string()))?;

        Ok(request
            .with_header(
                HeaderName::from_static(TIMESTAMP_HEADER),
                HeaderValue::from(timestamp),
            )
            .with_header(self.header.clone(), signature))
    }
}

/// Signs requests on the way out and opens payloads on the way back.
pub fn middleware<S: Signer>(signer: S) -> Middleware<Bytes, Bytes> {
    let signer = Arc::new(signer);
    Middleware::from_fn("signing", move |request, done, next| {
        let request_id = request.id();
        let signed = match signer.sign(request) {
            Ok(signed) => signed,
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Request signing failed");
                done(Err(e));
                return;
            }
        };
        debug!(request_id = %request_id, "Request signed");

        let signer = Arc::clone(&signer);
        next(
            signed,
            Box::new(move |result: PipelineResult<Bytes>| {
                done(result.and_then(|payload| signer.open(payload)));
            }),
        );
    })
}
