//! Virtual switch bank — in-memory switches implementing [`BinarySwitch`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use plughub_app::ports::{BinarySwitch, EventPublisher};
use plughub_domain::entity::SwitchState;
use plughub_domain::error::{HubError, NotFoundError};
use plughub_domain::event::StateChange;
use plughub_domain::id::EntityId;

use crate::error::VirtualError;

#[derive(Debug, Clone, Copy)]
struct VirtualSwitch {
    state: SwitchState,
    reachable: bool,
}

/// A set of simulated switches.
///
/// Every actual state change is published as a [`StateChange`], so
/// platforms watching a switch see commands issued by anyone.
pub struct VirtualSwitchBank<P> {
    switches: Mutex<HashMap<EntityId, VirtualSwitch>>,
    publisher: P,
}

impl<P: EventPublisher> VirtualSwitchBank<P> {
    #[must_use]
    pub fn new(publisher: P) -> Self {
        Self {
            switches: Mutex::new(HashMap::new()),
            publisher,
        }
    }

    /// Create `entity_id` in the `Off` state. Existing switches are kept.
    pub fn add_switch(&self, entity_id: EntityId) {
        self.lock_switches()
            .entry(entity_id)
            .or_insert(VirtualSwitch {
                state: SwitchState::Off,
                reachable: true,
            });
    }

    #[must_use]
    pub fn state_of(&self, entity_id: &EntityId) -> Option<SwitchState> {
        self.lock_switches().get(entity_id).map(|switch| switch.state)
    }

    /// Make every read and command on `entity_id` fail (or succeed again).
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] for an unknown switch.
    pub fn set_unreachable(&self, entity_id: &EntityId, unreachable: bool) -> Result<(), HubError> {
        let mut switches = self.lock_switches();
        let switch = switches.get_mut(entity_id).ok_or_else(|| not_found(entity_id))?;
        switch.reachable = !unreachable;
        tracing::debug!(%entity_id, unreachable, "virtual switch reachability changed");
        Ok(())
    }

    /// Change a switch as if it had been operated out of band, including to
    /// `Unknown`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] for an unknown switch.
    pub async fn force_state(&self, entity_id: &EntityId, state: SwitchState) -> Result<(), HubError> {
        let change = {
            let mut switches = self.lock_switches();
            let switch = switches.get_mut(entity_id).ok_or_else(|| not_found(entity_id))?;
            transition(entity_id, switch, state)
        };
        self.publish(change).await
    }

    async fn publish(&self, change: Option<StateChange>) -> Result<(), HubError> {
        if let Some(change) = change {
            tracing::debug!(
                entity_id = %change.entity_id,
                new_state = %change.new_state,
                "virtual switch changed"
            );
            self.publisher.publish(change).await?;
        }
        Ok(())
    }

    fn lock_switches(&self) -> MutexGuard<'_, HashMap<EntityId, VirtualSwitch>> {
        self.switches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(entity_id: &EntityId) -> HubError {
    NotFoundError {
        entity: "Switch",
        id: entity_id.to_string(),
    }
    .into()
}

fn transition(entity_id: &EntityId, switch: &mut VirtualSwitch, state: SwitchState) -> Option<StateChange> {
    if switch.state == state {
        return None;
    }
    let old = std::mem::replace(&mut switch.state, state);
    Some(StateChange::new(entity_id.clone(), Some(old), state))
}

impl<P: EventPublisher + Send + Sync> BinarySwitch for VirtualSwitchBank<P> {
    async fn read(&self, entity_id: &EntityId) -> Result<SwitchState, HubError> {
        let switches = self.lock_switches();
        let switch = switches.get(entity_id).ok_or_else(|| not_found(entity_id))?;
        if !switch.reachable {
            return Err(VirtualError::SwitchUnreachable(entity_id.to_string()).into());
        }
        Ok(switch.state)
    }

    async fn set(&self, entity_id: &EntityId, on: bool) -> Result<(), HubError> {
        let change = {
            let mut switches = self.lock_switches();
            let switch = switches.get_mut(entity_id).ok_or_else(|| not_found(entity_id))?;
            if !switch.reachable {
                return Err(VirtualError::SwitchUnreachable(entity_id.to_string()).into());
            }
            transition(entity_id, switch, on.into())
        };
        self.publish(change).await
    }
}
