//! # plughub-platform-repeater
//!
//! Switches that mirror a target switch and forward every command to it a
//! configurable number of times, with an optional pause in between.
//!
//! ## Dependency rule
//!
//! Depends on `plughub-app` (port traits) and `plughub-domain` only.

mod config;
mod switch;

pub use config::RepeaterConfig;
pub use switch::RepeaterSwitch;

use std::collections::BTreeMap;
use std::sync::Arc;

use plughub_app::ports::{BinarySwitch, EventNotifier, Platform, StateStore};
use plughub_app::watch::RefreshWatcher;
use plughub_domain::entity::{Entity, SwitchState};
use plughub_domain::error::{ConfigurationError, HubError, NotFoundError, UnsupportedError};
use plughub_domain::id::EntityId;

/// Platform owning every configured repeater switch.
pub struct RepeaterPlatform<S> {
    switches: Vec<Arc<RepeaterSwitch<S>>>,
    watchers: Vec<RefreshWatcher>,
}

impl<S> RepeaterPlatform<S>
where
    S: BinarySwitch + Clone + 'static,
{
    /// Build one repeater per `slug -> config` entry.
    ///
    /// Invalid entries are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidConfiguration`] when no repeater could be
    /// created.
    pub fn new(configs: BTreeMap<String, RepeaterConfig>, switches: S) -> Result<Self, HubError> {
        let mut repeaters = Vec::with_capacity(configs.len());
        for (slug, config) in configs {
            match RepeaterSwitch::new(&slug, config, switches.clone()) {
                Ok(repeater) => repeaters.push(Arc::new(repeater)),
                Err(err) => {
                    tracing::error!(slug, error = %err, "invalid repeater configuration, skipping");
                }
            }
        }

        if repeaters.is_empty() {
            tracing::error!("no repeater switches added");
            return Err(ConfigurationError::NoEntities {
                platform: "repeater",
            }
            .into());
        }

        Ok(Self {
            switches: repeaters,
            watchers: Vec::new(),
        })
    }

    #[must_use]
    pub fn switch(&self, entity_id: &EntityId) -> Option<&RepeaterSwitch<S>> {
        self.switches
            .iter()
            .find(|switch| switch.entity_id() == entity_id)
            .map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.switches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }
}

impl<S> Platform for RepeaterPlatform<S>
where
    S: BinarySwitch + Clone + 'static,
{
    fn name(&self) -> &'static str {
        "repeater"
    }

    fn entities(&self) -> Result<Vec<Entity>, HubError> {
        self.switches.iter().map(|switch| switch.entity()).collect()
    }

    async fn attach(
        &mut self,
        notifier: &impl EventNotifier,
        store: &impl StateStore,
    ) -> Result<(), HubError> {
        for switch in &self.switches {
            match store.load_last_state(switch.target()).await {
                Ok(Some(last)) => switch.seed(last.state == SwitchState::On),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(entity_id = %switch.entity_id(), error = %err, "unable to load last state");
                }
            }

            let watched = Arc::clone(switch);
            self.watchers.push(RefreshWatcher::spawn(
                notifier,
                vec![switch.target().clone()],
                move || {
                    let switch = Arc::clone(&watched);
                    async move { switch.update().await }
                },
            ));

            switch.update().await;
            tracing::info!(
                entity_id = %switch.entity_id(),
                target = %switch.target(),
                "repeater switch attached"
            );
        }
        Ok(())
    }

    async fn handle_service_call(
        &self,
        entity_id: &EntityId,
        service: &str,
        _data: serde_json::Value,
    ) -> Result<Entity, HubError> {
        let switch = self.switch(entity_id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;

        match service {
            "turn_on" => switch.turn_on().await?,
            "turn_off" => switch.turn_off().await?,
            other => return Err(UnsupportedError::new(entity_id, other).into()),
        }
        switch.entity()
    }

    async fn detach(&mut self, store: &impl StateStore) -> Result<(), HubError> {
        for mut watcher in self.watchers.drain(..) {
            watcher.stop();
        }
        for switch in &self.switches {
            let saved = match switch.entity() {
                Ok(entity) => store.save_last_state(entity).await,
                Err(err) => Err(err),
            };
            if let Err(err) = saved {
                tracing::warn!(entity_id = %switch.entity_id(), error = %err, "unable to save last state");
            }
        }
        tracing::info!(switches = self.switches.len(), "repeater platform detached");
        Ok(())
    }

    fn owns_entity(&self, entity_id: &EntityId) -> bool {
        self.switch(entity_id).is_some()
    }
}
