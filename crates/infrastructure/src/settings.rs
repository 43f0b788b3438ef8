//! Runtime settings.
//!
//! Loaded from built-in defaults overlaid with `MEMBERDESK_*` environment
//! variables, or constructed directly by the test harness.

use ::config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

/// Prefix of the environment variables read by [`Settings::load`].
pub const ENV_PREFIX: &str = "MEMBERDESK";

/// Settings loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or a value could not be deserialized.
    #[error("configuration error: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Settings shared by the web API and the test harness.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// SQLite database location (`sqlite://path` or a plain path).
    pub database_url: String,
    /// Base URL of the external API proxied under `/api/v1/external`.
    pub external_api_url: String,
    /// Address the web API binds to.
    pub listen_addr: String,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Caller recorded when a request carries no `x-user-id` header.
    #[serde(default)]
    pub default_user: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://memberdesk.db".to_string(),
            external_api_url: "http://127.0.0.1:1080".to_string(),
            listen_addr: "127.0.0.1:8080".to_string(),
            log_filter: "info".to_string(),
            default_user: None,
        }
    }
}

impl Settings {
    /// Loads settings from defaults and `MEMBERDESK_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be deserialized.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads settings from defaults overlaid with the given environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be deserialized.
    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("database_url", defaults.database_url)?
            .set_default("external_api_url", defaults.external_api_url)?
            .set_default("listen_addr", defaults.listen_addr)?
            .set_default("log_filter", defaults.log_filter)?
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_environment(environment(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::from_environment(environment(&[
            ("MEMBERDESK_DATABASE_URL", "sqlite:///tmp/x.db"),
            ("MEMBERDESK_DEFAULT_USER", "system"),
        ]))
        .unwrap();
        assert_eq!(settings.database_url, "sqlite:///tmp/x.db");
        assert_eq!(settings.default_user.as_deref(), Some("system"));
        assert_eq!(settings.listen_addr, "127.0.0.1:8080");
    }
}
