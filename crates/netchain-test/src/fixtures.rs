//! Shared payload fixtures.

use http::Uri;
use netchain_core::Request;
use serde::{Deserialize, Serialize};

/// Session payload returned by the stub session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session token.
    pub token: String,
}

/// Raw body of the stub session endpoint.
pub const SESSION_JSON: &[u8] = br#"{"token":"123456"}"#;

/// A `GET /session` request against the stub host.
pub fn session_request() -> Request {
    Request::get(Uri::from_static("https://api.example.com/session"))
}
