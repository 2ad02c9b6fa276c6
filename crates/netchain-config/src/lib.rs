//! Typed configuration for netchain.
//!
//! This crate provides a strongly-typed configuration system for netchain
//! clients with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`NetchainConfig`] holds every section:
//!
//! - [`TransportConfig`] - HTTP transport settings (base URL, timeouts, pool)
//! - [`SigningConfig`] - Request signing settings
//! - [`LoggingConfig`] - Log level and format
//!
//! # Example
//!
//! ```no_run
//! use netchain_config::{ConfigLoader, NetchainConfig};
//!
//! # fn main() -> Result<(), netchain_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("netchain.toml")?
//!     .with_env_prefix("NETCHAIN")
//!     .load()?;
//!
//! println!("Requests time out after {} ms", config.transport.timeout_ms);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! service_name = "session-client"
//!
//! [transport]
//! base_url = "https://api.example.com"
//! timeout_ms = 30000
//! connect_timeout_ms = 5000
//! user_agent = "netchain/0.1.0"
//! pool_max_idle_per_host = 32
//!
//! [signing]
//! enabled = true
//! secret = "change-me"
//! header = "x-content-signature"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`. For example:
//!
//! - `NETCHAIN__TRANSPORT__BASE_URL=https://staging.example.com`
//! - `NETCHAIN__SIGNING__SECRET=s3cr3t`
//! - `NETCHAIN__LOGGING__LEVEL=debug`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::{ConfigError, Field, Section};
pub use loader::ConfigLoader;
pub use netchain_telemetry::LogFormat;
pub use schema::*;
