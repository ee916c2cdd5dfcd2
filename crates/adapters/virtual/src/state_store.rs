//! In-memory state store.
//!
//! Snapshots live as long as the process: a platform detached and attached
//! again on the same host is restored, a restarted daemon starts empty.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use plughub_app::ports::StateStore;
use plughub_domain::entity::Entity;
use plughub_domain::error::HubError;
use plughub_domain::id::EntityId;

/// Last persisted entity snapshot per entity id.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: Mutex<HashMap<EntityId, Entity>>,
}

impl InMemoryStateStore {
    /// Persist `entity` as the last snapshot for its id.
    pub fn save(&self, entity: Entity) {
        tracing::debug!(entity_id = %entity.entity_id, state = %entity.state, "last state saved");
        self.lock_states().insert(entity.entity_id.clone(), entity);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_states().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_states().is_empty()
    }

    fn lock_states(&self) -> MutexGuard<'_, HashMap<EntityId, Entity>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStore for InMemoryStateStore {
    async fn load_last_state(&self, entity_id: &EntityId) -> Result<Option<Entity>, HubError> {
        Ok(self.lock_states().get(entity_id).cloned())
    }

    async fn save_last_state(&self, entity: Entity) -> Result<(), HubError> {
        self.save(entity);
        Ok(())
    }
}
