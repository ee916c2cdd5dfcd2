//! Fan service calls — parsing of hub service payloads into commands.

use serde_json::Value;

use plughub_domain::error::{HubError, UnsupportedError, ValidationError};
use plughub_domain::fan::{Direction, Speed};
use plughub_domain::id::EntityId;

/// A fan operation requested through the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanCommand {
    TurnOn { speed: Option<Speed> },
    TurnOff,
    SetSpeed(Speed),
    Oscillate(bool),
    SetDirection(Direction),
}

impl FanCommand {
    /// Parse `service` and its `data` payload.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unsupported`] for an unknown service and
    /// [`HubError::Validation`] for a missing or malformed field.
    pub fn parse(entity_id: &EntityId, service: &str, data: &Value) -> Result<Self, HubError> {
        let command = match service {
            "turn_on" => Self::TurnOn {
                speed: optional_str(data, "speed")?
                    .map(str::parse::<Speed>)
                    .transpose()?,
            },
            "turn_off" => Self::TurnOff,
            "set_speed" => Self::SetSpeed(required_str(data, "speed")?.parse()?),
            "set_direction" => Self::SetDirection(required_str(data, "direction")?.parse()?),
            "oscillate" => Self::Oscillate(required_bool(data, "oscillating")?),
            other => return Err(UnsupportedError::new(entity_id, other).into()),
        };
        Ok(command)
    }
}

fn optional_str<'a>(data: &'a Value, field: &'static str) -> Result<Option<&'a str>, ValidationError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            value: other.to_string(),
        }),
    }
}

fn required_str<'a>(data: &'a Value, field: &'static str) -> Result<&'a str, ValidationError> {
    optional_str(data, field)?.ok_or(ValidationError::MissingField(field))
}

fn required_bool(data: &Value, field: &'static str) -> Result<bool, ValidationError> {
    match data.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(Value::Bool(value)) => Ok(*value),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            value: other.to_string(),
        }),
    }
}
