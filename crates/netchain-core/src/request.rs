//! Outbound request descriptor.
//!
//! A [`Request`] is immutable once built. Middleware that needs to annotate a
//! request (attach a signature, a request ID, an encoded body) produces a new
//! value with one of the `with_*` methods and forwards that to the next stage.
//! Nothing can change a request that has already been handed on.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PipelineError, PipelineResult};

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// correlate and sort.
///
/// # Example
///
/// ```
/// use netchain_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// An outbound call descriptor.
///
/// # Example
///
/// ```
/// use netchain_core::Request;
/// use http::Method;
///
/// let request = Request::builder()
///     .method(Method::POST)
///     .uri("https://api.example.com/sessions")
///     .header("accept", "application/json")
///     .build()
///     .unwrap();
///
/// let signed = request.clone().with_header(
///     http::HeaderName::from_static("x-signature"),
///     http::HeaderValue::from_static("abc"),
/// );
///
/// assert!(request.headers().get("x-signature").is_none());
/// assert_eq!(signed.headers()["x-signature"], "abc");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    id: RequestId,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Creates a `GET` request for the given URI.
    #[must_use]
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Creates a `POST` request for the given URI with an empty body.
    #[must_use]
    pub fn post(uri: Uri) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Creates a request with the given method and URI.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            id: RequestId::new(),
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Returns a builder for requests assembled from strings.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the target URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Splits the request into method, URI, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (Method, Uri, HeaderMap, Bytes) {
        (self.method, self.uri, self.headers, self.body)
    }

    /// Returns a request identical to this one with `name` set to `value`.
    ///
    /// An existing value for `name` is replaced.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns a request identical to this one with the given body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns a request whose body is `value` serialized as JSON.
    ///
    /// Also sets `content-type: application/json`.
    pub fn with_json_body<T: Serialize + ?Sized>(self, value: &T) -> PipelineResult<Self> {
        let body = serde_json::to_vec(value).map_err(|e| PipelineError::encode(e.to_string()))?;
        Ok(self
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body))
    }
}

/// Builder for [`Request`] values parsed from strings.
///
/// The first invalid part is remembered and reported by [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    error: Option<PipelineError>,
}

impl RequestBuilder {
    /// Creates a builder for a `GET` request with no URI.
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            uri: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the target URI.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        match uri.parse::<Uri>() {
            Ok(uri) => self.uri = Some(uri),
            Err(e) => self.fail(format!("invalid uri '{uri}': {e}")),
        }
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => self.fail(format!("invalid header '{name}'")),
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Encode` if a part was invalid or no URI was set.
    pub fn build(self) -> PipelineResult<Request> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let uri = self
            .uri
            .ok_or_else(|| PipelineError::encode("request has no uri"))?;

        Ok(Request {
            id: RequestId::new(),
            method: self.method,
            uri,
            headers: self.headers,
            body: self.body,
        })
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(PipelineError::encode(message));
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_get_defaults() {
        let request = Request::get("https://example.com/a".parse().unwrap());
        assert_eq!(request.method(), Method::GET);
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_with_header_keeps_id() {
        let request = Request::get("https://example.com".parse().unwrap());
        let id = request.id();
        let updated = request.with_header(
            HeaderName::from_static("x-test"),
            HeaderValue::from_static("1"),
        );
        assert_eq!(updated.id(), id);
        assert_eq!(updated.headers()["x-test"], "1");
    }

    #[test]
    fn test_with_json_body() {
        let request = Request::post("https://example.com".parse().unwrap())
            .with_json_body(&serde_json::json!({"user": "alice"}))
            .unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.body().as_ref(), br#"{"user":"alice"}"#);
    }

    #[test]
    fn test_builder() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("https://example.com/items/1")
            .header("accept", "application/json")
            .body("payload")
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.uri().path(), "/items/1");
        assert_eq!(request.body().as_ref(), b"payload");
    }

    #[test]
    fn test_builder_missing_uri() {
        let result = Request::builder().build();
        assert!(matches!(result, Err(PipelineError::Encode { .. })));
    }

    #[test]
    fn test_builder_reports_first_error() {
        let result = Request::builder()
            .uri("not a uri")
            .header("bad header", "x")
            .build();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("invalid uri"));
    }

    #[test]
    fn test_into_parts() {
        let request = Request::post("https://example.com/login".parse().unwrap()).with_body("pw");
        let (method, uri, headers, body) = request.into_parts();

        assert_eq!(method, Method::POST);
        assert_eq!(uri.path(), "/login");
        assert!(headers.is_empty());
        assert_eq!(body.as_ref(), b"pw");
    }
}
