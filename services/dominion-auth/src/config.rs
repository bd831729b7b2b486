//! Centralized configuration for the auth core.
//!
//! All configuration is loaded from environment variables and validated
//! at startup. Missing signing secrets are a startup failure, never a
//! runtime error of the issuer or verifier.

use secrecy::{ExposeSecret, SecretString};
use std::env;
use thiserror::Error;

use crate::jwt::SigningKeyPair;
use crate::observability::{LogFormat, TracingConfig};

/// Default `iss` tag embedded in every token.
pub const DEFAULT_ISSUER: &str = "codex-dominion";

/// Default token lifetime in minutes.
pub const DEFAULT_EXPIRY_MINUTES: u32 = 60;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Why parsing failed
        reason: String,
    },

    /// Value parsed but is out of range
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue {
        /// Variable name
        name: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Auth core configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary signing secret; used for issuance and tried first on verification
    pub primary_secret: SecretString,
    /// Secondary signing secret; verification fallback during key rotation
    pub secondary_secret: SecretString,
    /// `iss` claim value
    pub issuer: String,
    /// Lifetime applied when a caller does not pass one
    pub default_expiry_minutes: u32,
    /// Logging setup
    pub tracing: TracingConfig,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tracing = TracingConfig {
            level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format: parse_var(&lookup, "LOG_FORMAT", LogFormat::Text)?,
        };

        let config = Self {
            primary_secret: required_secret(&lookup, "DOMINION_JWT_PRIMARY_SECRET")?,
            secondary_secret: required_secret(&lookup, "DOMINION_JWT_SECONDARY_SECRET")?,
            issuer: lookup("DOMINION_JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
            default_expiry_minutes: parse_var(
                &lookup,
                "DOMINION_TOKEN_EXPIRY_MINUTES",
                DEFAULT_EXPIRY_MINUTES,
            )?,
            tracing,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "DOMINION_JWT_PRIMARY_SECRET".to_string(),
            ));
        }
        if self.secondary_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "DOMINION_JWT_SECONDARY_SECRET".to_string(),
            ));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::MissingRequired("DOMINION_JWT_ISSUER".to_string()));
        }
        if self.default_expiry_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DOMINION_TOKEN_EXPIRY_MINUTES".to_string(),
                reason: "default expiry must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the key pair from the configured secrets.
    #[must_use]
    pub fn signing_keys(&self) -> SigningKeyPair {
        SigningKeyPair::new(self.primary_secret.clone(), self.secondary_secret.clone())
    }
}

/// Read a secret that must be present.
fn required_secret<F>(lookup: &F, name: &str) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingRequired(name.to_string()))
}

/// Parse a variable, falling back to `default` when it is unset.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val.parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_config_base() -> Config {
        Config {
            primary_secret: SecretString::from("primary-secret-for-tests"),
            secondary_secret: SecretString::from("secondary-secret-for-tests"),
            issuer: DEFAULT_ISSUER.to_string(),
            default_expiry_minutes: DEFAULT_EXPIRY_MINUTES,
            tracing: TracingConfig::default(),
        }
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(test_config_base().validate().is_ok());
    }

    #[test]
    fn test_config_validation_blank_primary() {
        let mut config = test_config_base();
        config.primary_secret = SecretString::from("   ");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(name)) if name == "DOMINION_JWT_PRIMARY_SECRET"
        ));
    }

    #[test]
    fn test_config_validation_blank_secondary() {
        let mut config = test_config_base();
        config.secondary_secret = SecretString::from("");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(name)) if name == "DOMINION_JWT_SECONDARY_SECRET"
        ));
    }

    #[test]
    fn test_config_validation_zero_expiry() {
        let mut config = test_config_base();
        config.default_expiry_minutes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", test_config_base());
        assert!(!rendered.contains("primary-secret-for-tests"));
        assert!(!rendered.contains("secondary-secret-for-tests"));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const SECRETS: [(&str, &str); 2] = [
        ("DOMINION_JWT_PRIMARY_SECRET", "primary-secret-for-tests"),
        ("DOMINION_JWT_SECONDARY_SECRET", "secondary-secret-for-tests"),
    ];

    #[test]
    fn test_from_lookup_defaults() {
        let config = Config::from_lookup(vars(&SECRETS)).unwrap();
        assert_eq!(config.issuer, DEFAULT_ISSUER);
        assert_eq!(config.default_expiry_minutes, DEFAULT_EXPIRY_MINUTES);
        assert_eq!(config.tracing.level, "info");
        assert_eq!(config.tracing.format, LogFormat::Text);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let mut pairs = SECRETS.to_vec();
        pairs.extend([
            ("DOMINION_JWT_ISSUER", "axiom-flame"),
            ("DOMINION_TOKEN_EXPIRY_MINUTES", "15"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "json"),
        ]);
        let config = Config::from_lookup(vars(&pairs)).unwrap();
        assert_eq!(config.issuer, "axiom-flame");
        assert_eq!(config.default_expiry_minutes, 15);
        assert_eq!(config.tracing.level, "debug");
        assert_eq!(config.tracing.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_primary_secret_fails_startup() {
        let result = Config::from_lookup(vars(&[SECRETS[1]]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired(name)) if name == "DOMINION_JWT_PRIMARY_SECRET"
        ));
    }

    #[test]
    fn test_missing_secondary_secret_fails_startup() {
        let result = Config::from_lookup(vars(&[SECRETS[0]]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired(name)) if name == "DOMINION_JWT_SECONDARY_SECRET"
        ));
    }

    #[test]
    fn test_unknown_log_format_fails_startup() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("LOG_FORMAT", "yaml"));
        assert!(matches!(
            Config::from_lookup(vars(&pairs)),
            Err(ConfigError::ParseError { name, .. }) if name == "LOG_FORMAT"
        ));
    }

    #[test]
    fn test_unparsable_expiry_fails_startup() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("DOMINION_TOKEN_EXPIRY_MINUTES", "sixty"));
        assert!(matches!(
            Config::from_lookup(vars(&pairs)),
            Err(ConfigError::ParseError { name, .. }) if name == "DOMINION_TOKEN_EXPIRY_MINUTES"
        ));
    }

    #[test]
    fn test_required_secret_unset_in_process_env() {
        let lookup = |name: &str| env::var(name).ok();
        assert!(matches!(
            required_secret(&lookup, "DOMINION_TEST_SURELY_UNSET_SECRET"),
            Err(ConfigError::MissingRequired(name)) if name == "DOMINION_TEST_SURELY_UNSET_SECRET"
        ));
    }

    #[test]
    fn test_parse_var_default_when_unset() {
        let value: u32 = parse_var(&vars(&[]), "DOMINION_TOKEN_EXPIRY_MINUTES", 42).unwrap();
        assert_eq!(value, 42);
    }
}
