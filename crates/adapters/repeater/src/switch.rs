//! Repeater switch — mirrors a target switch and repeats every command.
//!
//! Some switches (cheap RF sockets, IR-driven appliances) miss commands.
//! The repeater forwards each `turn_on`/`turn_off` to its target `count`
//! times with a pause in between.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use plughub_app::ports::BinarySwitch;
use plughub_domain::entity::{Entity, SwitchState};
use plughub_domain::error::HubError;
use plughub_domain::id::EntityId;

use crate::config::RepeaterConfig;

/// A switch forwarding its commands to `target` several times.
pub struct RepeaterSwitch<S> {
    entity_id: EntityId,
    friendly_name: String,
    target: EntityId,
    count: u32,
    interval: Duration,
    switches: S,
    /// `None` while the target's state is unknown.
    state: Mutex<Option<bool>>,
}

impl<S: BinarySwitch> RepeaterSwitch<S> {
    /// Build the repeater configured under `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidConfiguration`] for an unusable slug or a
    /// zero repeat count.
    pub fn new(slug: &str, config: RepeaterConfig, switches: S) -> Result<Self, HubError> {
        config.validate()?;
        let entity_id = RepeaterConfig::entity_id(slug)?;
        let interval = config.interval();

        Ok(Self {
            entity_id,
            friendly_name: config.friendly_name.unwrap_or_else(|| slug.to_string()),
            target: config.switch,
            count: config.count,
            interval,
            switches,
            state: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    #[must_use]
    pub fn target(&self) -> &EntityId {
        &self.target
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.lock_state().unwrap_or(false)
    }

    #[must_use]
    pub fn available(&self) -> bool {
        self.lock_state().is_some()
    }

    /// Restore the last known state.
    pub fn seed(&self, on: bool) {
        *self.lock_state() = Some(on);
    }

    /// Re-read the target switch.
    ///
    /// An unknown reading or a failing read makes the repeater unavailable.
    pub async fn update(&self) {
        let state = match self.switches.read(&self.target).await {
            Ok(reported) => {
                let state = reported.as_bool();
                if state.is_none() {
                    tracing::error!(
                        entity_id = %self.entity_id,
                        target = %self.target,
                        %reported,
                        "received invalid switch state, expected on or off"
                    );
                }
                state
            }
            Err(err) => {
                tracing::error!(
                    entity_id = %self.entity_id,
                    target = %self.target,
                    error = %err,
                    "unable to read target switch"
                );
                None
            }
        };
        *self.lock_state() = state;
    }

    /// # Errors
    ///
    /// Propagates the first failing command; the state is left untouched.
    pub async fn turn_on(&self) -> Result<(), HubError> {
        self.repeat(true).await
    }

    /// # Errors
    ///
    /// Propagates the first failing command; the state is left untouched.
    pub async fn turn_off(&self) -> Result<(), HubError> {
        self.repeat(false).await
    }

    async fn repeat(&self, on: bool) -> Result<(), HubError> {
        for attempt in 1..=self.count {
            if attempt > 1 && !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }
            self.switches.set(&self.target, on).await?;
            tracing::debug!(
                entity_id = %self.entity_id,
                target = %self.target,
                on,
                attempt,
                count = self.count,
                "command forwarded"
            );
        }
        *self.lock_state() = Some(on);
        Ok(())
    }

    /// Hub entity snapshot.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the entity cannot be built.
    pub fn entity(&self) -> Result<Entity, HubError> {
        let state = *self.lock_state();
        let entity = Entity::builder(self.entity_id.clone())
            .friendly_name(self.friendly_name.as_str())
            .state(state.map_or(SwitchState::Unknown, SwitchState::from))
            .available(state.is_some())
            .attribute("target", self.target.as_str())
            .attribute("count", i64::from(self.count))
            .attribute(
                "interval",
                i64::try_from(self.interval.as_secs()).unwrap_or(i64::MAX),
            )
            .build()?;
        Ok(entity)
    }

    fn lock_state(&self) -> MutexGuard<'_, Option<bool>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
