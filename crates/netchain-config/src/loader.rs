//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, NetchainConfig};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON) or an in-memory string
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use netchain_config::ConfigLoader;
///
/// # fn main() -> Result<(), netchain_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("netchain.toml")?
///     .with_env_prefix("NETCHAIN")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: NetchainConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: NetchainConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is what `new()` does, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = NetchainConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use netchain_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = NetchainConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = NetchainConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unsupported.
    ///
    /// # Example
    ///
    /// ```
    /// use netchain_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [transport]
    ///     base_url = "https://api.example.com"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.transport.base_url.as_deref(), Some("https://api.example.com"));
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `NETCHAIN__TRANSPORT__TIMEOUT_MS=5000`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::Dotenv(e)),
        }
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation fails.
    pub fn load(mut self) -> Result<NetchainConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without applying overrides or validating.
    #[must_use]
    pub fn load_unvalidated(self) -> NetchainConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<NetchainConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<no extension>").to_string(),
            )),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(&marker))
            .collect();
        // Sorted so the first failing variable is stable.
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env(key, "PREFIX__SECTION__KEY"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["SERVICE_NAME"] => {
                self.config.service_name = value.to_string();
            }

            // Transport section
            ["TRANSPORT", "BASE_URL"] => {
                self.config.transport.base_url = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["TRANSPORT", "TIMEOUT_MS"] => {
                self.config.transport.timeout_ms = parse_number(key, value)?;
            }
            ["TRANSPORT", "CONNECT_TIMEOUT_MS"] => {
                self.config.transport.connect_timeout_ms = parse_number(key, value)?;
            }
            ["TRANSPORT", "USER_AGENT"] => {
                self.config.transport.user_agent = value.to_string();
            }
            ["TRANSPORT", "POOL_MAX_IDLE_PER_HOST"] => {
                self.config.transport.pool_max_idle_per_host = parse_number(key, value)?;
            }

            // Signing section
            ["SIGNING", "ENABLED"] => {
                self.config.signing.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "a boolean"))?;
            }
            ["SIGNING", "SECRET"] => {
                self.config.signing.secret = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["SIGNING", "HEADER"] => {
                self.config.signing.header = value.to_ascii_lowercase();
            }

            // Logging section
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "a boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = value
                    .parse::<LogFormat>()
                    .map_err(|_| ConfigError::env(key, "'json' or 'pretty'"))?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "a boolean"))?;
            }

            // Unknown keys are ignored.
            _ => {}
        }

        Ok(())
    }
}

fn parse_number<N: std::str::FromStr>(key: &str, value: &str) -> Result<N, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env(key, "an integer"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.service_name, "netchain");
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"transport": {"timeout_ms": 2500}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.transport.timeout_ms, 2500);
    }

    #[test]
    fn test_loader_with_string_unsupported_format() {
        let result = ConfigLoader::new().with_string("", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(f)) if f == "yaml"));
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            service_name = "session-client"

            [signing]
            enabled = true
            secret = "s3cr3t"
            "#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.service_name, "session-client");
        assert!(config.signing.enabled);
        assert_eq!(config.signing.secret.as_deref(), Some("s3cr3t"));
    }

    #[test]
    fn test_loader_with_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/netchain.toml");
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/netchain.toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config, NetchainConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let toml = r#"
            [signing]
            enabled = true
        "#;

        let result = ConfigLoader::new().with_string(toml, "toml").unwrap().load();
        assert!(matches!(result, Err(ConfigError::Required { .. })));
    }

    #[test]
    fn test_loader_load_unvalidated() {
        let config = ConfigLoader::new().load_unvalidated();
        assert_eq!(config.transport.timeout_ms, 30_000);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));

        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));

        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    // Each test touching the process environment uses its own prefix so
    // parallel tests never see each other's variables.

    #[test]
    fn test_load_reads_prefixed_environment() {
        env::set_var("LOADERENV__TRANSPORT__BASE_URL", "https://env.example.com");
        env::set_var("LOADERENV__SIGNING__ENABLED", "true");
        env::set_var("LOADERENV__SIGNING__SECRET", "from-env");
        env::set_var("LOADERENV_SERVICE_NAME", "single-underscore");

        let config = ConfigLoader::new()
            .with_env_prefix("loaderenv")
            .load()
            .unwrap();

        assert_eq!(
            config.transport.base_url.as_deref(),
            Some("https://env.example.com")
        );
        assert!(config.signing.enabled);
        assert_eq!(config.signing.secret.as_deref(), Some("from-env"));
        assert_eq!(config.service_name, "netchain");
    }

    #[test]
    fn test_load_reports_bad_environment_value() {
        env::set_var("LOADERBAD__TRANSPORT__TIMEOUT_MS", "soon");

        let err = ConfigLoader::new()
            .with_env_prefix("LOADERBAD")
            .load()
            .unwrap_err();

        assert!(matches!(
            &err,
            ConfigError::Env { var, .. } if var == "LOADERBAD__TRANSPORT__TIMEOUT_MS"
        ));
    }

    #[test]
    fn test_apply_env_var_transport() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__TRANSPORT__BASE_URL", "https://staging.example.com", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TRANSPORT__TIMEOUT_MS", "1500", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TRANSPORT__POOL_MAX_IDLE_PER_HOST", "4", "TEST")
            .unwrap();

        assert_eq!(
            loader.config.transport.base_url.as_deref(),
            Some("https://staging.example.com")
        );
        assert_eq!(loader.config.transport.timeout_ms, 1500);
        assert_eq!(loader.config.transport.pool_max_idle_per_host, 4);
    }

    #[test]
    fn test_apply_env_var_empty_base_url_clears() {
        let mut loader = ConfigLoader::new();
        loader.config.transport.base_url = Some("https://api.example.com".to_string());
        loader
            .apply_env_var("TEST__TRANSPORT__BASE_URL", "", "TEST")
            .unwrap();
        assert!(loader.config.transport.base_url.is_none());
    }

    #[test]
    fn test_apply_env_var_signing() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SIGNING__ENABLED", "yes", "TEST").unwrap();
        loader.apply_env_var("TEST__SIGNING__SECRET", "s3cr3t", "TEST").unwrap();
        loader
            .apply_env_var("TEST__SIGNING__HEADER", "X-Api-Signature", "TEST")
            .unwrap();

        assert!(loader.config.signing.enabled);
        assert_eq!(loader.config.signing.secret.as_deref(), Some("s3cr3t"));
        assert_eq!(loader.config.signing.header, "x-api-signature");
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__LOGGING__LEVEL", "debug", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__FORMAT", "pretty", "TEST").unwrap();
        assert_eq!(loader.config.logging.level, "debug");
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__TRANSPORT__TIMEOUT_MS", "soon", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__SIGNING__ENABLED", "maybe", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__CACHE__SIZE", "10", "TEST").unwrap();
        assert_eq!(loader.config, NetchainConfig::default());
    }
}
