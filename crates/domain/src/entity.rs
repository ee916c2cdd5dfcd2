//! Entity — the hub's generic view of a device.
//!
//! Platforms expose their internal state to the hub as an [`Entity`]
//! snapshot: an id, a display name, an on/off state, an availability flag
//! and a bag of typed attributes.

mod attribute_value;
mod state;

pub use attribute_value::AttributeValue;
pub use state::SwitchState;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::EntityId;
use crate::time::{Timestamp, now};

/// Snapshot of a platform entity as seen by the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    pub friendly_name: String,
    pub state: SwitchState,
    pub available: bool,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub last_updated: Timestamp,
}

impl Entity {
    /// Start building an entity for `entity_id`.
    #[must_use]
    pub fn builder(entity_id: EntityId) -> EntityBuilder {
        EntityBuilder {
            entity_id,
            friendly_name: String::new(),
            state: SwitchState::Unknown,
            available: true,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

/// Builder for [`Entity`].
#[derive(Debug)]
pub struct EntityBuilder {
    entity_id: EntityId,
    friendly_name: String,
    state: SwitchState,
    available: bool,
    attributes: BTreeMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = name.into();
        self
    }

    #[must_use]
    pub fn state(mut self, state: SwitchState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Finish the entity, stamping `last_updated` with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when no friendly name was set.
    pub fn build(self) -> Result<Entity, ValidationError> {
        if self.friendly_name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Entity {
            entity_id: self.entity_id,
            friendly_name: self.friendly_name,
            state: self.state,
            available: self.available,
            attributes: self.attributes,
            last_updated: now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan_id() -> EntityId {
        "fan.bedroom".parse().unwrap()
    }

    #[test]
    fn should_build_entity_with_attributes() {
        let entity = Entity::builder(fan_id())
            .friendly_name("Bedroom")
            .state(SwitchState::On)
            .attribute("speed", "low")
            .attribute("oscillating", true)
            .build()
            .unwrap();

        assert_eq!(entity.entity_id.as_str(), "fan.bedroom");
        assert_eq!(entity.state, SwitchState::On);
        assert!(entity.available);
        assert_eq!(
            entity.get_attribute("speed"),
            Some(&AttributeValue::String("low".to_string()))
        );
        assert_eq!(
            entity.get_attribute("oscillating"),
            Some(&AttributeValue::Bool(true))
        );
    }

    #[test]
    fn should_reject_entity_without_name() {
        let result = Entity::builder(fan_id()).build();
        assert_eq!(result, Err(ValidationError::EmptyName));
    }

    #[test]
    fn should_default_to_unknown_and_available() {
        let entity = Entity::builder(fan_id())
            .friendly_name("Bedroom")
            .build()
            .unwrap();
        assert_eq!(entity.state, SwitchState::Unknown);
        assert!(entity.available);
        assert!(entity.attributes.is_empty());
    }

    #[test]
    fn should_mark_entity_unavailable() {
        let entity = Entity::builder(fan_id())
            .friendly_name("Bedroom")
            .available(false)
            .build()
            .unwrap();
        assert!(!entity.available);
    }
}
