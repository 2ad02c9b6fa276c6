//! Error types for netchain.
//!
//! This module provides [`PipelineError`], the single failure channel shared by
//! every stage of a pipeline. Transport failures, decode failures, signing
//! failures and domain errors raised by custom middleware all travel through
//! the same `Result` so the caller's completion sees exactly one outcome.
//!
//! Errors are data: no stage panics on a failure path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`PipelineError`].
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Categories of errors for classification and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The transport could not deliver the request or returned an error status.
    Transport,
    /// The transport did not answer in time.
    Timeout,
    /// The payload did not match the expected shape.
    Decode,
    /// The request body could not be encoded.
    Encode,
    /// Signing the request or opening the response failed.
    Signature,
    /// The pipeline itself could not run (e.g. no async runtime).
    Internal,
    /// A domain error raised by a custom middleware.
    Domain,
}

impl ErrorCategory {
    /// Returns the label used for this category in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::Signature => "signature",
            Self::Internal => "internal",
            Self::Domain => "domain",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload could not be decoded into the requested type.
///
/// # Example
///
/// ```
/// use netchain_core::DecodeError;
///
/// let err = DecodeError::new("Session", "missing field `token`");
/// assert_eq!(err.type_name(), "Session");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("cannot decode {type_name}: {message}")]
pub struct DecodeError {
    type_name: String,
    message: String,
    line: Option<usize>,
    column: Option<usize>,
}

impl DecodeError {
    /// Creates a decode error for the named target type.
    #[must_use]
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Creates a decode error from a `serde_json` failure, keeping its position.
    #[must_use]
    pub fn from_json(type_name: impl Into<String>, err: &serde_json::Error) -> Self {
        Self {
            type_name: type_name.into(),
            message: err.to_string(),
            line: Some(err.line()),
            column: Some(err.column()),
        }
    }

    /// Returns the name of the type that failed to decode.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the underlying decoder message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the 1-based line of the failure, when the decoder reports one.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        self.line
    }

    /// Returns the 1-based column of the failure, when the decoder reports one.
    #[must_use]
    pub const fn column(&self) -> Option<usize> {
        self.column
    }
}

/// Standard error type for netchain pipelines.
///
/// # Example
///
/// ```
/// use netchain_core::{ErrorCategory, PipelineError};
///
/// let err = PipelineError::transport("connection reset");
/// assert_eq!(err.category(), ErrorCategory::Transport);
/// assert!(err.is_retryable());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The transport failed to deliver the request.
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable error message.
        message: String,
        /// HTTP status returned by the peer, if any.
        status: Option<u16>,
    },

    /// The transport did not answer in time.
    #[error("timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// The payload did not match the expected shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request body could not be encoded.
    #[error("encode error: {message}")]
    Encode {
        /// Human-readable error message.
        message: String,
    },

    /// Signing or signature verification failed.
    #[error("signature error: {message}")]
    Signature {
        /// Human-readable error message.
        message: String,
    },

    /// The pipeline could not be driven to completion.
    #[error("runtime error: {message}")]
    Runtime {
        /// Human-readable error message.
        message: String,
    },

    /// A domain error raised by a custom middleware.
    #[error("{code}: {message}")]
    Custom {
        /// Machine-readable error code.
        code: String,
        /// Human-readable error message.
        message: String,
    },
}

impl PipelineError {
    /// Creates a transport error without a status code.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a transport error carrying the peer's status code.
    #[must_use]
    pub fn transport_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a decode error for the named target type.
    #[must_use]
    pub fn decode(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode(DecodeError::new(type_name, message))
    }

    /// Creates an encode error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates a signature error.
    #[must_use]
    pub fn signature(message: impl Into<String>) -> Self {
        Self::Signature {
            message: message.into(),
        }
    }

    /// Creates a runtime error.
    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Creates a domain error for custom middleware.
    #[must_use]
    pub fn custom(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Custom {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Decode(_) => ErrorCategory::Decode,
            Self::Encode { .. } => ErrorCategory::Encode,
            Self::Signature { .. } => ErrorCategory::Signature,
            Self::Runtime { .. } => ErrorCategory::Internal,
            Self::Custom { .. } => ErrorCategory::Domain,
        }
    }

    /// Returns the peer status code for transport errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns `true` if sending the same request again could succeed.
    ///
    /// Timeouts and transport failures qualify; a 4xx status never does.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status, .. } => !matches!(status, Some(400..=499)),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns the inner decode error, if this is one.
    #[must_use]
    pub const fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}
