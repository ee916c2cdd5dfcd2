//! Fan model — speeds, directions, capabilities and observed state.
//!
//! A fan platform composes this state out of plain switches and scripts; the
//! types here carry no IO and enforce no wiring, they only describe what a
//! fan *can* do and what it was last seen doing.

mod capability;

pub use capability::CapabilitySet;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{AttributeValue, Entity, SwitchState};
use crate::error::ValidationError;

/// Three-level fan speed plus `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    #[default]
    Off,
    Low,
    Medium,
    High,
}

impl Speed {
    /// Every speed, in the order exposed as the `speed_list` attribute.
    pub const ALL: [Speed; 4] = [Self::Off, Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Speed {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidField {
                field: "speed",
                value: s.to_string(),
            })
    }
}

/// Rotation direction of the blades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "reverse" => Ok(Self::Reverse),
            other => Err(ValidationError::InvalidField {
                field: "direction",
                value: other.to_string(),
            }),
        }
    }
}

/// What a fan was last observed (or optimistically assumed) to be doing.
///
/// `speed`, `oscillating` and `direction` are only meaningful when the
/// matching capability is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservedState {
    pub power: SwitchState,
    pub speed: Speed,
    pub oscillating: bool,
    pub direction: Option<Direction>,
}

impl ObservedState {
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.power == SwitchState::On
    }

    /// Record a power reading.
    ///
    /// `Unknown` never overwrites a known value: once the power state has
    /// been observed it only moves between `On` and `Off`.
    pub fn observe_power(&mut self, reported: SwitchState) {
        if reported.is_known() {
            self.power = reported;
        }
    }

    /// Rebuild the state from a persisted fan entity snapshot.
    ///
    /// Missing or unreadable attributes fall back to their defaults.
    #[must_use]
    pub fn restore(entity: &Entity) -> Self {
        let text = |key: &str| match entity.get_attribute(key) {
            Some(AttributeValue::String(value)) => Some(value.as_str()),
            _ => None,
        };

        Self {
            power: entity.state,
            speed: text("speed")
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            oscillating: matches!(
                entity.get_attribute("oscillating"),
                Some(AttributeValue::Bool(true))
            ),
            direction: text("direction").and_then(|value| value.parse().ok()),
        }
    }
}
