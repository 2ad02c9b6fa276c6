//! # Netchain Test
//!
//! Test utilities for netchain pipelines. Nothing here touches the network.
//!
//! ## Key Features
//!
//! - **Stub Transport**: canned replies, optional delay, captured requests
//! - **Synchronous Stage**: the same stub as a plain `StageFn`, no runtime needed
//! - **Call Recorder**: an ordered event log shared by layers, observers and the stub
//! - **Fixtures**: the `Session` payload used across the test suites
//!
//! ## Example
//!
//! ```
//! use netchain_test::{CallRecorder, StubTransport};
//! use netchain_core::{completion, Request};
//! use netchain_middleware::Middleware;
//! use bytes::Bytes;
//!
//! let recorder = CallRecorder::new();
//! let stub = StubTransport::ok("hello").with_recorder(recorder.clone());
//! let chain: Middleware<Bytes, Bytes> = recorder.layer("outer");
//!
//! chain.apply(stub.stage())(
//!     Request::get("https://example.com".parse().unwrap()),
//!     completion(|result| assert_eq!(result.unwrap(), Bytes::from_static(b"hello"))),
//! );
//!
//! assert_eq!(recorder.events(), ["outer:request", "transport", "outer:response"]);
//! ```

#![doc(html_root_url = "https://docs.rs/netchain-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod fixtures;
mod recorder;
mod stub;

pub use fixtures::{session_request, Session, SESSION_JSON};
pub use recorder::CallRecorder;
pub use stub::StubTransport;
