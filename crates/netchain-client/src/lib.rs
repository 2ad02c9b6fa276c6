//! # Netchain Client
//!
//! Runs netchain middleware chains against a real transport.
//!
//! - [`Transport`]: the innermost stage, turning a [`Request`] into raw bytes
//! - [`HttpTransport`]: a `reqwest`-backed transport configured from [`TransportConfig`]
//! - [`FnTransport`]: adapts an async closure, for stubs and tests
//! - [`Provider`]: a middleware chain bound to a transport
//!
//! ## Example
//!
//! ```no_run
//! use netchain_client::{HttpTransport, Provider};
//! use netchain_config::TransportConfig;
//! use netchain_middleware::stages::decode;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Session {
//!     token: String,
//! }
//!
//! # async fn run() -> Result<(), netchain_core::PipelineError> {
//! let transport = HttpTransport::new(&TransportConfig {
//!     base_url: Some("https://api.example.com".to_string()),
//!     ..Default::default()
//! })?;
//! let provider = Provider::new(decode::json::<Session>(), transport);
//!
//! let session = provider.send(netchain_core::Request::get("/session".parse().unwrap())).await?;
//! println!("token: {}", session.token);
//! # Ok(())
//! # }
//! ```
//!
//! [`Request`]: netchain_core::Request
//! [`TransportConfig`]: netchain_config::TransportConfig

#![doc(html_root_url = "https://docs.rs/netchain-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod provider;
pub mod transport;

pub use provider::Provider;
pub use transport::{BoxFuture, FnTransport, HttpTransport, Transport};
