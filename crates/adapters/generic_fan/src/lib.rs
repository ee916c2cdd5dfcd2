//! # plughub-platform-generic-fan
//!
//! Synthesizes fan entities out of host primitives. Each configured fan is
//! backed by:
//!
//! | Piece | Required | Capability |
//! |-------|----------|------------|
//! | Power switch | yes | — |
//! | Oscillation switch | no | `OSCILLATE` |
//! | Speed script (`{"speed": …}`) | no | `SET_SPEED` |
//! | Direction script (`{"direction": …}`) | no | `DIRECTION` |
//!
//! ## Dependency rule
//!
//! Depends on `plughub-app` (port traits) and `plughub-domain` only.

mod config;
mod fan;
mod service;

pub use config::FanConfig;
pub use fan::GenericFan;
pub use service::FanCommand;

use std::sync::Arc;

use plughub_app::ports::{BinarySwitch, EventNotifier, Platform, ScriptRunner, StateStore};
use plughub_app::watch::RefreshWatcher;
use plughub_domain::entity::Entity;
use plughub_domain::error::{HubError, NotFoundError};
use plughub_domain::fan::ObservedState;
use plughub_domain::id::EntityId;

/// Platform owning every configured generic fan.
pub struct GenericFanPlatform<S, R> {
    fans: Vec<Arc<GenericFan<S, R>>>,
    watchers: Vec<RefreshWatcher>,
}

impl<S, R> GenericFanPlatform<S, R>
where
    S: BinarySwitch + Clone + 'static,
    R: ScriptRunner + Clone + 'static,
{
    /// Build one fan per configuration.
    ///
    /// A configuration that fails validation is logged and skipped; the
    /// other fans are still created.
    pub fn new(configs: impl IntoIterator<Item = FanConfig>, switches: S, scripts: R) -> Self {
        let mut fans: Vec<Arc<GenericFan<S, R>>> = Vec::new();
        for config in configs {
            let name = config.name.clone();
            match GenericFan::new(config, switches.clone(), scripts.clone()) {
                Ok(fan) if fans.iter().any(|other| other.entity_id() == fan.entity_id()) => {
                    tracing::error!(entity_id = %fan.entity_id(), "duplicate fan, skipping");
                }
                Ok(fan) => fans.push(Arc::new(fan)),
                Err(err) => {
                    tracing::error!(name, error = %err, "invalid fan configuration, skipping");
                }
            }
        }
        Self {
            fans,
            watchers: Vec::new(),
        }
    }

    /// Look up a fan by its entity id.
    #[must_use]
    pub fn fan(&self, entity_id: &EntityId) -> Option<&GenericFan<S, R>> {
        self.fans
            .iter()
            .find(|fan| fan.entity_id() == entity_id)
            .map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fans.is_empty()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.watchers.is_empty()
    }
}

impl<S, R> Platform for GenericFanPlatform<S, R>
where
    S: BinarySwitch + Clone + 'static,
    R: ScriptRunner + Clone + 'static,
{
    fn name(&self) -> &'static str {
        "generic_fan"
    }

    fn entities(&self) -> Result<Vec<Entity>, HubError> {
        self.fans.iter().map(|fan| fan.entity()).collect()
    }

    async fn attach(
        &mut self,
        notifier: &impl EventNotifier,
        store: &impl StateStore,
    ) -> Result<(), HubError> {
        for fan in &self.fans {
            match store.load_last_state(fan.entity_id()).await {
                Ok(Some(last)) => fan.seed(ObservedState::restore(&last)),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(entity_id = %fan.entity_id(), error = %err, "unable to load last state");
                }
            }

            let watched = Arc::clone(fan);
            self.watchers.push(RefreshWatcher::spawn(
                notifier,
                fan.watched_switches(),
                move || {
                    let fan = Arc::clone(&watched);
                    async move {
                        if let Err(err) = fan.refresh().await {
                            tracing::warn!(entity_id = %fan.entity_id(), error = %err, "refresh failed");
                        }
                    }
                },
            ));

            if let Err(err) = fan.refresh().await {
                tracing::warn!(entity_id = %fan.entity_id(), error = %err, "initial refresh failed");
            }
            tracing::info!(
                entity_id = %fan.entity_id(),
                capabilities = %fan.current_capabilities(),
                "generic fan attached"
            );
        }
        Ok(())
    }

    async fn handle_service_call(
        &self,
        entity_id: &EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, HubError> {
        let fan = self.fan(entity_id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;

        let command = FanCommand::parse(entity_id, service, &data)?;
        tracing::debug!(%entity_id, ?command, "handling fan service call");
        fan.apply(command).await?;
        fan.entity()
    }

    async fn detach(&mut self, store: &impl StateStore) -> Result<(), HubError> {
        for mut watcher in self.watchers.drain(..) {
            watcher.stop();
        }
        for fan in &self.fans {
            let saved = match fan.entity() {
                Ok(entity) => store.save_last_state(entity).await,
                Err(err) => Err(err),
            };
            if let Err(err) = saved {
                tracing::warn!(entity_id = %fan.entity_id(), error = %err, "unable to save last state");
            }
        }
        tracing::info!(fans = self.fans.len(), "generic fan platform detached");
        Ok(())
    }

    fn owns_entity(&self, entity_id: &EntityId) -> bool {
        self.fan(entity_id).is_some()
    }
}
