//! Events — immutable records of something that happened on the host bus.

use serde::{Deserialize, Serialize};

use crate::entity::SwitchState;
use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

/// A switch-like entity changed state.
///
/// Delivered to listeners registered through the host's event notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub id: EventId,
    pub entity_id: EntityId,
    pub old_state: Option<SwitchState>,
    pub new_state: SwitchState,
    pub timestamp: Timestamp,
}

impl StateChange {
    /// Create a new change record stamped with the current time.
    #[must_use]
    pub fn new(entity_id: EntityId, old_state: Option<SwitchState>, new_state: SwitchState) -> Self {
        Self {
            id: EventId::new(),
            entity_id,
            old_state,
            new_state,
            timestamp: now(),
        }
    }

    /// Stand-in for changes of `entity_id` that were dropped before
    /// delivery. The current state is unknown and must be re-read.
    #[must_use]
    pub fn missed(entity_id: EntityId) -> Self {
        Self::new(entity_id, None, SwitchState::Unknown)
    }

    /// Whether the state actually moved (a first report always counts).
    #[must_use]
    pub fn is_transition(&self) -> bool {
        self.old_state != Some(self.new_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch_id() -> EntityId {
        "switch.fan1".parse().unwrap()
    }

    #[test]
    fn should_create_change_with_fresh_id() {
        let a = StateChange::new(switch_id(), None, SwitchState::On);
        let b = StateChange::new(switch_id(), None, SwitchState::On);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_report_transition_when_state_differs() {
        let change = StateChange::new(switch_id(), Some(SwitchState::Off), SwitchState::On);
        assert!(change.is_transition());
    }

    #[test]
    fn should_report_transition_for_first_report() {
        let change = StateChange::new(switch_id(), None, SwitchState::Off);
        assert!(change.is_transition());
    }

    #[test]
    fn should_not_report_transition_when_state_is_unchanged() {
        let change = StateChange::new(switch_id(), Some(SwitchState::On), SwitchState::On);
        assert!(!change.is_transition());
    }

    #[test]
    fn should_treat_missed_change_as_transition() {
        let change = StateChange::missed(switch_id());
        assert_eq!(change.old_state, None);
        assert_eq!(change.new_state, SwitchState::Unknown);
        assert!(change.is_transition());
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let change = StateChange::new(switch_id(), Some(SwitchState::Off), SwitchState::On);
        let json = serde_json::to_string(&change).unwrap();
        let parsed: StateChange = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, change);
    }
}
