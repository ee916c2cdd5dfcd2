//! Generic fan — a fan synthesized from switches and scripts.
//!
//! The fan owns nothing but its [`ObservedState`]. Every command is
//! forwarded to the host (power/oscillation switch, speed/direction script)
//! and the local state is written optimistically once the host
//! acknowledged it; [`GenericFan::refresh`] later reconciles it with what the
//! switches actually report.

use std::sync::{Mutex, MutexGuard, PoisonError};

use plughub_app::ports::{BinarySwitch, ScriptParams, ScriptRunner};
use plughub_domain::entity::{AttributeValue, Entity, SwitchState};
use plughub_domain::error::{HubError, UnsupportedError};
use plughub_domain::fan::{CapabilitySet, Direction, ObservedState, Speed};
use plughub_domain::id::EntityId;

use crate::config::FanConfig;
use crate::service::FanCommand;

/// A fan composed of a power switch plus optional oscillation switch and
/// speed/direction scripts.
pub struct GenericFan<S, R> {
    entity_id: EntityId,
    config: FanConfig,
    capabilities: CapabilitySet,
    switches: S,
    scripts: R,
    state: Mutex<ObservedState>,
}

impl<S: BinarySwitch, R: ScriptRunner> GenericFan<S, R> {
    /// Build a fan from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidConfiguration`] when the configuration
    /// does not validate.
    pub fn new(config: FanConfig, switches: S, scripts: R) -> Result<Self, HubError> {
        config.validate()?;
        let entity_id = config.entity_id()?;
        let capabilities = config.capabilities();

        tracing::debug!(%entity_id, %capabilities, "generic fan configured");

        Ok(Self {
            entity_id,
            config,
            capabilities,
            switches,
            scripts,
            state: Mutex::new(ObservedState::default()),
        })
    }

    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    #[must_use]
    pub fn config(&self) -> &FanConfig {
        &self.config
    }

    #[must_use]
    pub fn current_capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    #[must_use]
    pub fn observed_state(&self) -> ObservedState {
        *self.lock_state()
    }

    /// Switches whose out-of-band changes should trigger a refresh.
    #[must_use]
    pub fn watched_switches(&self) -> Vec<EntityId> {
        let mut ids = vec![self.config.power_switch.clone()];
        ids.extend(self.config.oscillation_switch.iter().cloned());
        ids
    }

    /// Replace the observed state with the last persisted one.
    pub fn seed(&self, last: ObservedState) {
        tracing::debug!(entity_id = %self.entity_id, power = %last.power, "seeding from last state");
        *self.lock_state() = last;
    }

    /// Power the fan on, then apply `speed` and reassert oscillation.
    ///
    /// The power command is always issued first. When `memory` is off and
    /// the fan was oscillating, the oscillation switch is turned back on
    /// last. An invalid power-switch reference is logged and ignored.
    ///
    /// # Errors
    ///
    /// Propagates failures of the power command (other than not-found),
    /// of the speed script, and of the oscillation reassertion.
    pub async fn turn_on(&self, speed: Option<Speed>) -> Result<(), HubError> {
        match self.switches.set(&self.config.power_switch, true).await {
            Ok(()) => {}
            Err(HubError::NotFound(err)) => {
                tracing::warn!(
                    entity_id = %self.entity_id,
                    power_switch = %self.config.power_switch,
                    error = %err,
                    "power switch not found, ignoring turn_on"
                );
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        let reassert_oscillation = {
            let mut state = self.lock_state();
            state.power = SwitchState::On;
            !self.config.memory && state.oscillating
        };
        tracing::debug!(entity_id = %self.entity_id, "power switch turned on");

        if let Some(speed) = speed {
            self.set_speed(speed).await?;
        }

        if reassert_oscillation {
            if let Some(switch) = &self.config.oscillation_switch {
                self.switches.set(switch, true).await?;
                tracing::debug!(entity_id = %self.entity_id, "oscillation reasserted");
            }
        }

        Ok(())
    }

    /// Power the fan off.
    ///
    /// Speed, oscillation and direction are remembered for the next
    /// [`turn_on`](Self::turn_on).
    ///
    /// # Errors
    ///
    /// Propagates failures of the power command.
    pub async fn turn_off(&self) -> Result<(), HubError> {
        self.switches.set(&self.config.power_switch, false).await?;
        self.lock_state().power = SwitchState::Off;
        tracing::debug!(entity_id = %self.entity_id, "power switch turned off");
        Ok(())
    }

    /// Run the speed script and record `speed` once acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unsupported`] when no speed script is configured,
    /// or the script's failure.
    pub async fn set_speed(&self, speed: Speed) -> Result<(), HubError> {
        let Some(script) = &self.config.set_speed_script else {
            return Err(self.unsupported("set_speed"));
        };

        let mut params = ScriptParams::new();
        params.insert("speed".to_string(), speed.as_str().into());
        self.scripts.invoke(script, params).await?;

        self.lock_state().speed = speed;
        tracing::debug!(entity_id = %self.entity_id, %speed, "speed set");
        Ok(())
    }

    /// Run the direction script and record `direction` once acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unsupported`] when no direction script is
    /// configured, or the script's failure.
    pub async fn set_direction(&self, direction: Direction) -> Result<(), HubError> {
        let Some(script) = &self.config.set_direction_script else {
            return Err(self.unsupported("set_direction"));
        };

        let mut params = ScriptParams::new();
        params.insert("direction".to_string(), direction.as_str().into());
        self.scripts.invoke(script, params).await?;

        self.lock_state().direction = Some(direction);
        tracing::debug!(entity_id = %self.entity_id, %direction, "direction set");
        Ok(())
    }

    /// Turn the oscillation switch on or off.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unsupported`] when no oscillation switch is
    /// configured, or the switch command's failure.
    pub async fn oscillate(&self, enabled: bool) -> Result<(), HubError> {
        let Some(switch) = &self.config.oscillation_switch else {
            return Err(self.unsupported("oscillate"));
        };

        self.switches.set(switch, enabled).await?;

        self.lock_state().oscillating = enabled;
        tracing::debug!(entity_id = %self.entity_id, enabled, "oscillation set");
        Ok(())
    }

    /// Re-read the power and oscillation switches.
    ///
    /// Never commands a switch. An `Unknown` reading leaves the previous
    /// value in place.
    ///
    /// # Errors
    ///
    /// Propagates read failures; nothing is updated in that case.
    pub async fn refresh(&self) -> Result<(), HubError> {
        let power = self.switches.read(&self.config.power_switch).await?;
        let oscillation = match &self.config.oscillation_switch {
            Some(switch) => Some(self.switches.read(switch).await?),
            None => None,
        };

        let mut state = self.lock_state();
        state.observe_power(power);
        if let Some(on) = oscillation.and_then(SwitchState::as_bool) {
            state.oscillating = on;
        }
        tracing::debug!(
            entity_id = %self.entity_id,
            power = %state.power,
            oscillating = state.oscillating,
            "fan refreshed"
        );
        Ok(())
    }

    /// Execute a parsed service command.
    ///
    /// # Errors
    ///
    /// Same as the operation the command maps to.
    pub async fn apply(&self, command: FanCommand) -> Result<(), HubError> {
        match command {
            FanCommand::TurnOn { speed } => self.turn_on(speed).await,
            FanCommand::TurnOff => self.turn_off().await,
            FanCommand::SetSpeed(speed) => self.set_speed(speed).await,
            FanCommand::Oscillate(enabled) => self.oscillate(enabled).await,
            FanCommand::SetDirection(direction) => self.set_direction(direction).await,
        }
    }

    /// Hub entity snapshot.
    ///
    /// Capability-specific attributes are only present when the capability
    /// is.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the entity cannot be built.
    pub fn entity(&self) -> Result<Entity, HubError> {
        let state = self.observed_state();
        let mut builder = Entity::builder(self.entity_id.clone())
            .friendly_name(self.config.name.as_str())
            .state(state.power)
            .attribute("assumed_state", true)
            .attribute("supported_features", i64::from(self.capabilities.bits()));

        if self.capabilities.contains(CapabilitySet::SET_SPEED) {
            let speed_list = Speed::ALL.iter().map(|s| s.as_str().to_string()).collect();
            builder = builder
                .attribute("speed", state.speed.as_str())
                .attribute("speed_list", AttributeValue::List(speed_list));
        }
        if self.capabilities.contains(CapabilitySet::OSCILLATE) {
            builder = builder.attribute("oscillating", state.oscillating);
        }
        if self.capabilities.contains(CapabilitySet::DIRECTION) {
            if let Some(direction) = state.direction {
                builder = builder.attribute("direction", direction.as_str());
            }
        }

        Ok(builder.build()?)
    }

    fn unsupported(&self, operation: &str) -> HubError {
        UnsupportedError::new(&self.entity_id, operation).into()
    }

    fn lock_state(&self) -> MutexGuard<'_, ObservedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
