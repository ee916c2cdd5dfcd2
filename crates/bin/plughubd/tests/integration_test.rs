//! End-to-end tests for the full plughubd stack.
//!
//! Each test wires the real platforms to the virtual host (switch bank,
//! script runner, state store, in-process event bus) and drives them
//! through service calls and out-of-band switch changes.

use std::collections::BTreeMap;
use std::sync::Arc;

use plughub_adapter_virtual::{VirtualHost, VirtualScriptRunner, VirtualSwitchBank};
use plughub_app::event_bus::InProcessEventBus;
use plughub_app::ports::{BinarySwitch, Platform};
use plughub_domain::entity::{AttributeValue, SwitchState};
use plughub_domain::error::HubError;
use plughub_domain::fan::Speed;
use plughub_domain::id::EntityId;
use plughub_platform_generic_fan::{FanConfig, GenericFanPlatform};
use plughub_platform_repeater::{RepeaterConfig, RepeaterPlatform};
use serde_json::json;

type Fans = GenericFanPlatform<Arc<VirtualSwitchBank<Arc<InProcessEventBus>>>, Arc<VirtualScriptRunner>>;

fn id(raw: &str) -> EntityId {
    raw.parse().unwrap()
}

fn host() -> VirtualHost {
    VirtualHost::new([
        id("switch.fan1"),
        id("switch.osc1"),
        id("switch.rf_plug"),
    ])
}

fn bedroom() -> FanConfig {
    FanConfig::new("Bedroom", id("switch.fan1"))
        .with_oscillation_switch(id("switch.osc1"))
        .with_speed_script("script.fan_speed".parse().unwrap())
}

async fn attached_fans(host: &VirtualHost, configs: Vec<FanConfig>) -> Fans {
    let mut fans = GenericFanPlatform::new(
        configs,
        Arc::clone(&host.switches),
        Arc::clone(&host.scripts),
    );
    fans.attach(&host.bus, &host.store).await.unwrap();
    settle().await;
    fans
}

/// Let the notifier and refresh tasks catch up.
async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// Generic fan
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_drive_switches_and_scripts_from_service_calls() {
    let host = host();
    let mut fans = attached_fans(&host, vec![bedroom()]).await;

    let entity = fans
        .handle_service_call(&id("fan.bedroom"), "turn_on", json!({"speed": "medium"}))
        .await
        .unwrap();

    assert_eq!(entity.state, SwitchState::On);
    assert_eq!(
        entity.get_attribute("speed"),
        Some(&AttributeValue::String("medium".to_string()))
    );
    assert_eq!(host.switches.state_of(&id("switch.fan1")), Some(SwitchState::On));
    let invocations = host.scripts.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].script.as_str(), "script.fan_speed");
    assert_eq!(invocations[0].params["speed"], "medium");

    fans.detach(&host.store).await.unwrap();
}

#[tokio::test]
async fn should_refresh_fan_when_power_switch_changes_out_of_band() {
    let host = host();
    let mut fans = attached_fans(&host, vec![bedroom()]).await;
    let fan = fans.fan(&id("fan.bedroom")).unwrap();
    assert_eq!(fan.observed_state().power, SwitchState::Off);

    host.switches.set(&id("switch.fan1"), true).await.unwrap();
    settle().await;
    assert_eq!(fan.observed_state().power, SwitchState::On);

    host.switches.set(&id("switch.osc1"), true).await.unwrap();
    settle().await;
    assert!(fan.observed_state().oscillating);

    fans.detach(&host.store).await.unwrap();
}

#[tokio::test]
async fn should_reassert_oscillation_after_power_cycle() {
    let host = host();
    // an RF oscillation relay cannot report its state
    host.switches
        .force_state(&id("switch.osc1"), SwitchState::Unknown)
        .await
        .unwrap();
    let mut fans = attached_fans(&host, vec![bedroom()]).await;
    let fan_id = id("fan.bedroom");

    fans.handle_service_call(&fan_id, "turn_on", json!({}))
        .await
        .unwrap();
    fans.handle_service_call(&fan_id, "oscillate", json!({"oscillating": true}))
        .await
        .unwrap();
    fans.handle_service_call(&fan_id, "turn_off", json!({}))
        .await
        .unwrap();
    // the fan forgets oscillation when unpowered
    host.switches
        .force_state(&id("switch.osc1"), SwitchState::Unknown)
        .await
        .unwrap();
    settle().await;
    assert!(fans.fan(&fan_id).unwrap().observed_state().oscillating);

    fans.handle_service_call(&fan_id, "turn_on", json!({}))
        .await
        .unwrap();

    assert_eq!(host.switches.state_of(&id("switch.fan1")), Some(SwitchState::On));
    assert_eq!(host.switches.state_of(&id("switch.osc1")), Some(SwitchState::On));

    fans.detach(&host.store).await.unwrap();
}

#[tokio::test]
async fn should_restore_fan_state_after_detach_and_attach() {
    let host = host();
    let mut fans = attached_fans(&host, vec![bedroom()]).await;
    fans.handle_service_call(&id("fan.bedroom"), "set_speed", json!({"speed": "high"}))
        .await
        .unwrap();
    fans.detach(&host.store).await.unwrap();
    assert_eq!(host.store.len(), 1);

    let mut fans = attached_fans(&host, vec![bedroom()]).await;

    let state = fans.fan(&id("fan.bedroom")).unwrap().observed_state();
    assert_eq!(state.speed, Speed::High);
    assert_eq!(state.power, SwitchState::Off);

    fans.detach(&host.store).await.unwrap();
}

#[tokio::test]
async fn should_surface_unreachable_switch_and_unsupported_capability() {
    let host = host();
    let mut fans = attached_fans(
        &host,
        vec![bedroom(), FanConfig::new("Office", id("switch.fan2"))],
    )
    .await;

    host.switches
        .set_unreachable(&id("switch.fan1"), true)
        .unwrap();
    let result = fans
        .handle_service_call(&id("fan.bedroom"), "turn_off", json!({}))
        .await;
    assert!(matches!(result, Err(HubError::Unreachable(_))));

    let result = fans
        .handle_service_call(&id("fan.office"), "oscillate", json!({"oscillating": true}))
        .await;
    assert!(matches!(result, Err(HubError::Unsupported(_))));

    // the office power switch does not exist on the host: turn_on is a no-op
    let entity = fans
        .handle_service_call(&id("fan.office"), "turn_on", json!({}))
        .await
        .unwrap();
    assert_eq!(entity.state, SwitchState::Unknown);

    fans.detach(&host.store).await.unwrap();
}

// ---------------------------------------------------------------------------
// Repeater
// ---------------------------------------------------------------------------

fn repeaters(host: &VirtualHost) -> RepeaterPlatform<Arc<VirtualSwitchBank<Arc<InProcessEventBus>>>> {
    let mut configs = BTreeMap::new();
    configs.insert(
        "garden_lights".to_string(),
        RepeaterConfig::new(id("switch.rf_plug"))
            .with_friendly_name("Garden lights")
            .with_count(3),
    );
    RepeaterPlatform::new(configs, Arc::clone(&host.switches)).unwrap()
}

#[tokio::test]
async fn should_mirror_and_command_target_switch() {
    let host = host();
    let mut platform = repeaters(&host);
    platform.attach(&host.bus, &host.store).await.unwrap();
    settle().await;
    let repeater_id = id("switch.garden_lights");

    let entity = platform
        .handle_service_call(&repeater_id, "turn_on", json!({}))
        .await
        .unwrap();
    assert_eq!(entity.state, SwitchState::On);
    assert_eq!(
        host.switches.state_of(&id("switch.rf_plug")),
        Some(SwitchState::On)
    );

    host.switches.set(&id("switch.rf_plug"), false).await.unwrap();
    settle().await;
    assert!(!platform.switch(&repeater_id).unwrap().is_on());

    host.switches
        .force_state(&id("switch.rf_plug"), SwitchState::Unknown)
        .await
        .unwrap();
    settle().await;
    let entity = platform.entities().unwrap().remove(0);
    assert!(!entity.available);

    platform.detach(&host.store).await.unwrap();
}
