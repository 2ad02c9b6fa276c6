//! # Netchain Core
//!
//! Core types shared by every crate in the netchain pipeline.
//!
//! This crate provides the vocabulary the pipeline is written in:
//!
//! - [`Request`] - Immutable outbound call descriptor
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Completion`] - Single-shot result continuation
//! - [`PipelineError`] - Unified failure channel (transport, decode, signing, ...)
//! - [`DecodeError`] - Payload did not match the expected shape

#![doc(html_root_url = "https://docs.rs/netchain-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod completion;
mod error;
mod request;

pub use completion::{completion, Completion};
pub use error::{DecodeError, ErrorCategory, PipelineError, PipelineResult};
pub use request::{Request, RequestBuilder, RequestId};
