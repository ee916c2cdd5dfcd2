//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `plughub.toml` in the working directory (or the path in
//! `PLUGHUB_CONFIG`). Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use plughub_domain::id::EntityId;
use plughub_platform_generic_fan::FanConfig;
use plughub_platform_repeater::RepeaterConfig;

const DEFAULT_PATH: &str = "plughub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Virtual host settings.
    pub host: HostConfig,
    /// Generic fans, one `[[fans]]` table each.
    pub fans: Vec<FanConfig>,
    /// Repeater switches, keyed by slug (`[repeaters.<slug>]`).
    pub repeaters: BTreeMap<String, RepeaterConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Switches exposed by the virtual host.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub switches: Vec<EntityId>,
}

impl Config {
    /// Load configuration from `plughub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed or fails
    /// validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PLUGHUB_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PLUGHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging filter must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for switch in &self.host.switches {
            if !seen.insert(switch) {
                return Err(ConfigError::Validation(format!(
                    "host switch {switch} is declared twice"
                )));
            }
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "plughubd=info,plughub=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.filter, "plughubd=info,plughub=info");
        assert!(config.host.switches.is_empty());
        assert!(config.fans.is_empty());
        assert!(config.repeaters.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [logging]
            filter = "debug"

            [host]
            switches = ["switch.fan1", "switch.osc1", "switch.rf_plug"]

            [[fans]]
            name = "Bedroom"
            power_switch = "switch.fan1"
            oscillation_switch = "switch.osc1"
            set_speed_script = "script.fan_speed"

            [[fans]]
            name = "Office"
            power_switch = "switch.fan2"
            memory = true

            [repeaters.garden_lights]
            switch = "switch.rf_plug"
            count = 3
            interval_secs = 1
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.host.switches.len(), 3);
        assert_eq!(config.fans.len(), 2);
        assert_eq!(config.fans[0].name, "Bedroom");
        assert!(config.fans[1].memory);
        assert_eq!(config.repeaters["garden_lights"].count, 3);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert!(config.fans.is_empty());
    }

    #[test]
    fn should_reject_empty_logging_filter() {
        let mut config = Config::default();
        config.logging.filter = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_duplicate_host_switch() {
        let toml = r#"
            [host]
            switches = ["switch.fan1", "switch.fan1"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_report_parse_error_for_malformed_switch_id() {
        let toml = r#"
            [host]
            switches = ["Fan 1"]
        "#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
