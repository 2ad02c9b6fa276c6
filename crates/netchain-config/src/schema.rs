//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use netchain_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Transport configuration section.
///
/// Controls the HTTP transport used as the innermost stage of a provider.
///
/// # Example
///
/// ```
/// use netchain_config::TransportConfig;
///
/// let config = TransportConfig {
///     base_url: Some("https://api.example.com".to_string()),
///     timeout_ms: 10_000,
///     ..Default::default()
/// };
/// assert_eq!(config.timeout().as_secs(), 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Base URL that relative request URIs are joined onto.
    ///
    /// When unset, requests must carry absolute URIs.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Total request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum idle connections kept per host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout(),
            connect_timeout_ms: default_connect_timeout(),
            user_agent: default_user_agent(),
            pool_max_idle_per_host: default_pool_max_idle(),
        }
    }
}

impl TransportConfig {
    /// Total request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_timeout() -> u64 {
    30_000
}

fn default_connect_timeout() -> u64 {
    5_000
}

fn default_user_agent() -> String {
    concat!("netchain/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_pool_max_idle() -> usize {
    32
}

/// Request signing configuration section.
///
/// The secret is never printed by the `Debug` implementation.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SigningConfig {
    /// Enable request signing.
    #[serde(default)]
    pub enabled: bool,

    /// Shared signing secret. Required when signing is enabled.
    #[serde(default)]
    pub secret: Option<String>,

    /// Header carrying the signature.
    #[serde(default = "default_signature_header")]
    pub header: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret: None,
            header: default_signature_header(),
        }
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("enabled", &self.enabled)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("header", &self.header)
            .finish()
    }
}

fn default_signature_header() -> String {
    "x-content-signature".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log filter (trace, debug, info, warn, error, or `target=level` directives).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into a [`LogConfig`] for `init_logging`.
    #[must_use]
    pub fn to_log_config(&self, service_name: &str) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            file_line_info: self.include_location,
            service_name: service_name.to_string(),
            ..base
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
