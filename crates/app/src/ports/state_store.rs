//! State store port — the host's restore-state helper.

use std::future::Future;

use plughub_domain::entity::Entity;
use plughub_domain::error::HubError;
use plughub_domain::id::EntityId;

/// Gives access to the last persisted snapshot of an entity.
///
/// Platforms load snapshots once per entity when attached and save their
/// own entities when detached.
pub trait StateStore: Send + Sync {
    fn load_last_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send;

    /// Persist `entity` as the last known snapshot for its id.
    fn save_last_state(&self, entity: Entity) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: StateStore> StateStore for std::sync::Arc<T> {
    fn load_last_state(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send {
        (**self).load_last_state(entity_id)
    }

    fn save_last_state(&self, entity: Entity) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).save_last_state(entity)
    }
}
