//! # Netchain Middleware
//!
//! Type-transforming middleware for asynchronous request/response pipelines.
//!
//! A [`Middleware<In, Out>`] wraps a stage that produces `In` and exposes a
//! stage that produces `Out`; the payload type may change at every layer (raw
//! bytes → decoded object). Middlewares compose with [`Middleware::with`] into
//! a single chain whose innermost stage is the transport.
//!
//! ## Call Order
//!
//! ```text
//! loading.with(&decode).with(&sign)
//!
//! Request  → loading → decode → sign → transport
//!                                          ↓
//! Response ← loading ← decode ← sign ←─────┘
//! ```
//!
//! Request-side logic runs outermost first, completion-side logic innermost
//! first, and a failure travels outward through every layer unchanged unless a
//! layer explicitly recovers from it.
//!
//! ## Key Features
//!
//! - **Type Safety**: Each link checks that its input type matches the output of the layer below
//! - **At-most-once**: Completions are `FnOnce`; a second delivery does not compile
//! - **Stateless**: Middleware values are immutable and shareable across concurrent requests
//! - **Associative**: `(a.with(b)).with(c)` behaves exactly like `a.with(b.with(c))`
//!
//! ## Example
//!
//! ```
//! use netchain_middleware::stages::{decode, loading, signing, LogIndicator, Sha256Signer};
//! use netchain_middleware::Middleware;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Session {
//!     token: String,
//! }
//!
//! let chain: Middleware<bytes::Bytes, Session> = loading::middleware(LogIndicator::new())
//!     .with(&decode::json::<Session>())
//!     .with(&signing::middleware(Sha256Signer::new("secret")));
//!
//! assert_eq!(chain.layer_names(), ["loading", "decode", "signing"]);
//! ```

#![doc(html_root_url = "https://docs.rs/netchain-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod middleware;
pub mod stages;

// Re-export main types at crate root
pub use middleware::{stage, Middleware, StageFn};
pub use netchain_core::{Completion, PipelineError, PipelineResult, Request};
