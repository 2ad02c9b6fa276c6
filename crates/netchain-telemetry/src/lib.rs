//! Observability setup for netchain.
//!
//! Pipeline crates emit events through `tracing` macros and record metrics
//! through the `metrics` facade. This crate installs the subscriber that turns
//! those events into output:
//!
//! - **Logging**: JSON or pretty `tracing-subscriber` output filtered by `EnvFilter`
//! - **Fields**: standard field names shared by every layer ([`logging::fields`])
//!
//! No metrics exporter is installed here; applications that want metrics
//! install a `metrics` recorder of their choice.
//!
//! # Standard Metrics
//!
//! The telemetry stage in `netchain-middleware` emits:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `netchain_requests_total` | Counter | `service`, `outcome` | Finished requests |
//! | `netchain_request_duration_seconds` | Histogram | `service` | Request latency |
//! | `netchain_in_flight_requests` | Gauge | `service` | Requests awaiting completion |
//!
//! # Example
//!
//! ```rust,no_run
//! use netchain_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging already initialised");
//! tracing::info!(request_id = "0190...", "Request started");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
