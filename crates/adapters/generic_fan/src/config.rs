//! Generic fan configuration.

use serde::Deserialize;

use plughub_domain::error::ConfigurationError;
use plughub_domain::fan::CapabilitySet;
use plughub_domain::id::{EntityId, ScriptId, slugify};

/// Configuration of one generic fan.
///
/// Only `name` and `power_switch` are required; every optional piece that is
/// wired adds the matching capability.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FanConfig {
    /// Display name; the fan's entity id is `fan.<slug of name>`.
    pub name: String,
    /// Switch that powers the fan on and off.
    pub power_switch: EntityId,
    /// Switch driving the oscillation motor.
    #[serde(default)]
    pub oscillation_switch: Option<EntityId>,
    /// Script run with `{"speed": …}` to change speed.
    #[serde(default)]
    pub set_speed_script: Option<ScriptId>,
    /// Script run with `{"direction": …}` to change direction.
    #[serde(default)]
    pub set_direction_script: Option<ScriptId>,
    /// Whether the hardware remembers oscillation across a power cycle.
    ///
    /// When `false`, oscillation is reasserted after every power-on.
    #[serde(default)]
    pub memory: bool,
}

impl FanConfig {
    /// Minimal configuration: a name and a power switch.
    #[must_use]
    pub fn new(name: impl Into<String>, power_switch: EntityId) -> Self {
        Self {
            name: name.into(),
            power_switch,
            oscillation_switch: None,
            set_speed_script: None,
            set_direction_script: None,
            memory: false,
        }
    }

    #[must_use]
    pub fn with_oscillation_switch(mut self, switch: EntityId) -> Self {
        self.oscillation_switch = Some(switch);
        self
    }

    #[must_use]
    pub fn with_speed_script(mut self, script: ScriptId) -> Self {
        self.set_speed_script = Some(script);
        self
    }

    #[must_use]
    pub fn with_direction_script(mut self, script: ScriptId) -> Self {
        self.set_direction_script = Some(script);
        self
    }

    #[must_use]
    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    /// Entity id derived from the display name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnusableName`] when the name has no
    /// alphanumeric characters.
    pub fn entity_id(&self) -> Result<EntityId, ConfigurationError> {
        let slug = slugify(&self.name);
        if slug.is_empty() {
            return Err(ConfigurationError::UnusableName(self.name.clone()));
        }
        Ok(EntityId::from_parts("fan", &slug)?)
    }

    /// Check the wiring for contradictions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the name is unusable or a single
    /// switch is wired as both power and oscillation switch.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.entity_id()?;
        if self.oscillation_switch.as_ref() == Some(&self.power_switch) {
            return Err(ConfigurationError::SharedSwitch {
                entity_id: self.power_switch.to_string(),
            });
        }
        Ok(())
    }

    /// Capabilities provided by the wired optional pieces.
    #[must_use]
    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::from_wiring(
            self.set_speed_script.is_some(),
            self.oscillation_switch.is_some(),
            self.set_direction_script.is_some(),
        )
    }
}
