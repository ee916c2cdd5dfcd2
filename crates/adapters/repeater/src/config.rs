//! Repeater switch configuration.

use std::time::Duration;

use serde::Deserialize;

use plughub_domain::error::ConfigurationError;
use plughub_domain::id::EntityId;

const fn default_count() -> u32 {
    1
}

/// Configuration of one repeater switch, keyed by its slug.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepeaterConfig {
    /// The switch every command is forwarded to.
    pub switch: EntityId,
    /// Display name; defaults to the slug.
    #[serde(default)]
    pub friendly_name: Option<String>,
    /// How many times each command is sent.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Pause between two consecutive commands, in seconds.
    #[serde(default)]
    pub interval_secs: u64,
}

impl RepeaterConfig {
    #[must_use]
    pub fn new(switch: EntityId) -> Self {
        Self {
            switch,
            friendly_name: None,
            count: default_count(),
            interval_secs: 0,
        }
    }

    #[must_use]
    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub fn with_interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Entity id of the repeater configured under `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Id`] when `slug` is not a valid object
    /// id.
    pub fn entity_id(slug: &str) -> Result<EntityId, ConfigurationError> {
        Ok(EntityId::from_parts("switch", slug)?)
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroCount`] when `count` is 0.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.count == 0 {
            return Err(ConfigurationError::ZeroCount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn should_apply_defaults() {
        let config: RepeaterConfig = toml::from_str(r#"switch = "switch.rf_plug""#).unwrap();
        assert_eq!(config, RepeaterConfig::new("switch.rf_plug".parse().unwrap()));
        assert_eq!(config.count, 1);
        assert_eq!(config.interval(), Duration::ZERO);
    }

    #[test]
    fn should_deserialize_keyed_table() {
        let toml = r#"
            [garden_lights]
            switch = "switch.rf_plug"
            friendly_name = "Garden lights"
            count = 3
            interval_secs = 2
        "#;
        let configs: BTreeMap<String, RepeaterConfig> = toml::from_str(toml).unwrap();
        let config = &configs["garden_lights"];
        assert_eq!(config.friendly_name.as_deref(), Some("Garden lights"));
        assert_eq!(config.count, 3);
        assert_eq!(config.interval(), Duration::from_secs(2));
    }

    #[test]
    fn should_reject_negative_count() {
        let toml = r#"
            switch = "switch.rf_plug"
            count = -1
        "#;
        let result: Result<RepeaterConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_zero_count() {
        let config = RepeaterConfig::new("switch.rf_plug".parse().unwrap()).with_count(0);
        assert_eq!(config.validate(), Err(ConfigurationError::ZeroCount));
    }

    #[test]
    fn should_derive_entity_id_from_slug() {
        assert_eq!(
            RepeaterConfig::entity_id("garden_lights").unwrap().as_str(),
            "switch.garden_lights"
        );
        assert!(RepeaterConfig::entity_id("Garden Lights").is_err());
    }
}
