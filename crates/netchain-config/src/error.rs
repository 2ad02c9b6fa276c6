//! Errors raised while loading or validating a [`NetchainConfig`](crate::NetchainConfig).
//!
//! Validation failures carry the [`Field`] they concern, so callers can tell
//! a bad `transport.base_url` from a missing `signing.secret` without parsing
//! the message.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level configuration section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Top-level keys such as `service_name`.
    Service,
    /// `[transport]`
    Transport,
    /// `[signing]`
    Signing,
    /// `[logging]`
    Logging,
}

impl Section {
    /// Returns the section name as written in TOML.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Transport => "transport",
            Self::Signing => "signing",
            Self::Logging => "logging",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configuration key, displayed as its dotted path.
///
/// ```
/// use netchain_config::{Field, Section};
///
/// assert_eq!(Field::new(Section::Signing, "secret").to_string(), "signing.secret");
/// assert_eq!(Field::new(Section::Service, "service_name").to_string(), "service_name");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    /// Section the key lives in.
    pub section: Section,
    /// Key within the section.
    pub key: &'static str,
}

impl Field {
    /// Creates a field reference.
    #[must_use]
    pub const fn new(section: Section, key: &'static str) -> Self {
        Self { section, key }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section {
            Section::Service => f.write_str(self.key),
            section => write!(f, "{section}.{}", self.key),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config file passed to `with_file` does not exist.
    #[error("config file {} not found", path.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// A config file exists but could not be read.
    #[error("cannot read config file {}", path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Neither TOML nor JSON.
    #[error("unsupported config format '{0}', expected toml or json")]
    UnsupportedFormat(String),

    /// Malformed TOML, or an unknown key in a strict section.
    #[error("malformed TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or an unknown key in a strict section.
    #[error("malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A `.env` file exists but could not be parsed.
    #[error("cannot load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// An environment override has a value of the wrong shape.
    #[error("cannot parse {var}: expected {expected}")]
    Env {
        /// The full variable name, prefix included.
        var: String,
        /// What the value should look like.
        expected: &'static str,
    },

    /// A field holds a value that fails validation.
    #[error("{field}: {reason}")]
    Invalid {
        /// The offending field.
        field: Field,
        /// Why it was rejected.
        reason: String,
    },

    /// A field is unset although another setting needs it.
    #[error("{field} is required when {needed_by}")]
    Required {
        /// The missing field.
        field: Field,
        /// The setting that needs it.
        needed_by: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(section: Section, key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: Field::new(section, key),
            reason: reason.into(),
        }
    }

    pub(crate) fn env(var: &str, expected: &'static str) -> Self {
        Self::Env {
            var: var.to_string(),
            expected,
        }
    }

    /// Returns the field a validation error concerns.
    #[must_use]
    pub const fn field(&self) -> Option<Field> {
        match self {
            Self::Invalid { field, .. } | Self::Required { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Returns the section a validation error concerns.
    #[must_use]
    pub fn section(&self) -> Option<Section> {
        self.field().map(|field| field.section)
    }
}
