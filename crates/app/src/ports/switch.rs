//! Binary switch port — the host's on/off switches, addressed by id.

use std::future::Future;

use plughub_domain::entity::SwitchState;
use plughub_domain::error::HubError;
use plughub_domain::id::EntityId;

/// Read and command on/off switches owned by the host.
///
/// Platforms only hold [`EntityId`]s; the switches' lifecycle belongs to the
/// host. Implementations return [`HubError::NotFound`] for an id that does
/// not name a switch and [`HubError::Unreachable`] when the call itself
/// fails.
pub trait BinarySwitch: Send + Sync {
    /// Current reported state of `entity_id`.
    fn read(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<SwitchState, HubError>> + Send;

    /// Turn `entity_id` on (`true`) or off (`false`).
    fn set(&self, entity_id: &EntityId, on: bool)
    -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: BinarySwitch> BinarySwitch for std::sync::Arc<T> {
    fn read(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<SwitchState, HubError>> + Send {
        (**self).read(entity_id)
    }

    fn set(
        &self,
        entity_id: &EntityId,
        on: bool,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).set(entity_id, on)
    }
}
