//! # Netchain
//!
//! Type-transforming middleware pipelines for asynchronous request/response
//! clients.
//!
//! Independent concerns (loading signals, payload decoding, request signing,
//! telemetry) are written as isolated [`Middleware`] values and composed, in a
//! fixed order, into one chain that a [`Provider`] drives against a
//! [`Transport`]:
//!
//! ```text
//! caller → loading → decode → signing → transport
//! caller ← loading ← decode ← signing ←────┘
//! ```
//!
//! ## Crates
//!
//! | Crate                 | Contents                                           |
//! |-----------------------|----------------------------------------------------|
//! | `netchain-core`       | `Request`, `Completion`, `PipelineError`           |
//! | `netchain-middleware` | `Middleware`, `StageFn`, reference stages          |
//! | `netchain-client`     | `Transport`, `HttpTransport`, `Provider`           |
//! | `netchain-config`     | Layered configuration                              |
//! | `netchain-telemetry`  | Logging setup                                      |
//!
//! ## Example
//!
//! ```
//! use netchain::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Session {
//!     token: String,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), PipelineError> {
//! let chain = loading::middleware(LogIndicator::new())
//!     .with(&decode::json::<Session>())
//!     .with(&signing::middleware(Sha256Signer::new("secret")));
//!
//! let transport = FnTransport::new(|_request| async {
//!     Ok(bytes::Bytes::from_static(br#"{"token":"123456"}"#))
//! });
//! let provider = Provider::new(chain, transport);
//!
//! let session = provider
//!     .send(Request::get("https://api.example.com/session".parse().unwrap()))
//!     .await?;
//! assert_eq!(session.token, "123456");
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/netchain/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use netchain_client::{BoxFuture, FnTransport, HttpTransport, Provider, Transport};
pub use netchain_config::{ConfigError, ConfigLoader, NetchainConfig};
pub use netchain_core::{
    completion, Completion, DecodeError, ErrorCategory, PipelineError, PipelineResult, Request,
    RequestBuilder, RequestId,
};
pub use netchain_middleware::{stage, stages, Middleware, StageFn};
pub use netchain_telemetry::{init_logging, LogConfig};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports for building pipelines.
pub mod prelude {
    pub use netchain_core::{
        completion, Completion, DecodeError, PipelineError, PipelineResult, Request, RequestId,
    };

    pub use netchain_middleware::stages::{
        decode, encode, loading, request_id, signing, telemetry, FnIndicator, LoadingObserver,
        LogIndicator, Sha256Signer, Signer,
    };
    pub use netchain_middleware::{stage, Middleware, StageFn};

    pub use netchain_client::{FnTransport, HttpTransport, Provider, Transport};
}
