//! Capability set — which optional fan features are wired up.

use std::fmt;

use serde::Serialize;

/// Immutable set of optional fan features.
///
/// Computed once when a fan is built from its configuration and consulted
/// before every optional operation. The numeric values match the hub's
/// `supported_features` attribute, and the set serializes as that number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct CapabilitySet(u8);

bitflags::bitflags! {
    impl CapabilitySet: u8 {
        /// A speed-command script is configured.
        const SET_SPEED = 1;
        /// An oscillation switch is configured.
        const OSCILLATE = 1 << 1;
        /// A direction-command script is configured.
        const DIRECTION = 1 << 2;
    }
}

impl CapabilitySet {
    /// Build the set from which optional pieces are wired.
    #[must_use]
    pub fn from_wiring(speed_script: bool, oscillation_switch: bool, direction_script: bool) -> Self {
        let mut set = Self::empty();
        set.set(Self::SET_SPEED, speed_script);
        set.set(Self::OSCILLATE, oscillation_switch);
        set.set(Self::DIRECTION, direction_script);
        set
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<String> = self
            .iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect();
        f.write_str(&names.join("|"))
    }
}
