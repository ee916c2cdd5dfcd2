//! Platform port — lifecycle and service-call handling for device platforms.
//!
//! A platform turns configuration into hub entities backed by host
//! primitives (switches, scripts). It is attached once the host is running
//! and detached on shutdown.

use std::future::Future;

use plughub_domain::entity::Entity;
use plughub_domain::error::HubError;
use plughub_domain::id::EntityId;

use crate::ports::{EventNotifier, StateStore};

/// A pluggable device platform.
///
/// The composition root calls the lifecycle methods in order:
///
/// 1. [`attach`](Self::attach) — seed entities from persisted state and
///    register for change notifications
/// 2. (the hub runs, forwarding service calls via
///    [`handle_service_call`](Self::handle_service_call))
/// 3. [`detach`](Self::detach) — save entity snapshots, then drop
///    subscriptions and background tasks
pub trait Platform {
    /// Unique name identifying this platform (e.g. `"generic_fan"`).
    fn name(&self) -> &'static str;

    /// Current snapshot of every entity provided by the platform.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a snapshot cannot be built.
    fn entities(&self) -> Result<Vec<Entity>, HubError>;

    /// Seed entities from `store` and subscribe to the switches they track.
    fn attach(
        &mut self,
        notifier: &impl EventNotifier,
        store: &impl StateStore,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Handle a service call (e.g. `turn_on`, `set_speed`) for an entity
    /// owned by this platform.
    ///
    /// Returns the entity snapshot after handling the call.
    fn handle_service_call(
        &self,
        entity_id: &EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Called on shutdown. Saves every entity snapshot to `store`, then
    /// drops subscriptions and background tasks.
    fn detach(&mut self, store: &impl StateStore) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Whether this platform owns `entity_id`.
    fn owns_entity(&self, entity_id: &EntityId) -> bool;
}
