//! Main configuration types.
//!
//! This module provides the top-level [`NetchainConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, Field, LogFormat, LoggingConfig, Section, SigningConfig, TransportConfig,
};

/// Complete netchain client configuration.
///
/// This is the root configuration type that contains all configuration sections.
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use netchain_config::NetchainConfig;
///
/// let config = NetchainConfig::default();
/// assert_eq!(config.service_name, "netchain");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NetchainConfig {
    /// Name reported in logs and metric labels.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Transport configuration.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Request signing configuration.
    #[serde(default)]
    pub signing: SigningConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for NetchainConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            transport: TransportConfig::default(),
            signing: SigningConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_service_name() -> String {
    "netchain".to_string()
}

impl NetchainConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> NetchainConfigBuilder {
        NetchainConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` or `ConfigError::Required` naming the
    /// offending [`Field`] if:
    /// - `service_name` is empty
    /// - `transport.base_url` is set but is not an `http(s)://` URL
    /// - A timeout is zero
    /// - `transport.user_agent` is not a valid header value
    /// - Signing is enabled without a secret, or the header name is invalid
    /// - `logging.level` is not a valid filter
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::invalid(
                Section::Service,
                "service_name",
                "must not be empty",
            ));
        }

        if let Some(base_url) = &self.transport.base_url {
            let rest = base_url
                .strip_prefix("https://")
                .or_else(|| base_url.strip_prefix("http://"));
            match rest {
                Some(host) if !host.is_empty() => {}
                _ => {
                    return Err(ConfigError::invalid(
                        Section::Transport,
                        "base_url",
                        format!("expected an http:// or https:// URL, got '{base_url}'"),
                    ))
                }
            }
        }

        if self.transport.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                Section::Transport,
                "timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.transport.connect_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                Section::Transport,
                "connect_timeout_ms",
                "must be greater than zero",
            ));
        }

        if !self
            .transport
            .user_agent
            .bytes()
            .all(|b| b == b'\t' || (0x20..0x7f).contains(&b))
        {
            return Err(ConfigError::invalid(
                Section::Transport,
                "user_agent",
                "must be printable ASCII",
            ));
        }

        if self.signing.enabled
            && self
                .signing
                .secret
                .as_deref()
                .map_or(true, |s| s.is_empty())
        {
            return Err(ConfigError::Required {
                field: Field::new(Section::Signing, "secret"),
                needed_by: "signing.enabled is true",
            });
        }

        let header = &self.signing.header;
        if header.is_empty()
            || !header
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(ConfigError::invalid(
                Section::Signing,
                "header",
                format!("'{header}' is not a lowercase header name"),
            ));
        }

        netchain_telemetry::create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid(Section::Logging, "level", e.to_string()))?;

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting
    /// - Debug log level with source locations
    ///
    /// # Example
    ///
    /// ```
    /// use netchain_config::NetchainConfig;
    ///
    /// let config = NetchainConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON log formatting at info level
    /// - Shorter transport timeout
    ///
    /// # Example
    ///
    /// ```
    /// use netchain_config::{LogFormat, NetchainConfig};
    ///
    /// let config = NetchainConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;

        config.transport.timeout_ms = 10_000;

        config
    }
}

/// Builder for [`NetchainConfig`].
#[derive(Debug, Default)]
pub struct NetchainConfigBuilder {
    service_name: Option<String>,
    transport: Option<TransportConfig>,
    signing: Option<SigningConfig>,
    logging: Option<LoggingConfig>,
}

impl NetchainConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service name.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Set the transport configuration.
    #[must_use]
    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the signing configuration.
    #[must_use]
    pub fn signing(mut self, signing: SigningConfig) -> Self {
        self.signing = Some(signing);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> NetchainConfig {
        NetchainConfig {
            service_name: self.service_name.unwrap_or_else(default_service_name),
            transport: self.transport.unwrap_or_default(),
            signing: self.signing.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<NetchainConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
