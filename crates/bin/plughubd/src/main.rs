//! # plughubd — plughub daemon
//!
//! Composition root that wires the platforms to a host and runs them.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the tracing subscriber
//! - Build the virtual host (switches, scripts, state store, event bus)
//! - Construct the generic fan and repeater platforms
//! - Attach them, then detach on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use plughub_adapter_virtual::VirtualHost;
use plughub_app::ports::Platform;
use plughub_platform_generic_fan::GenericFanPlatform;
use plughub_platform_repeater::RepeaterPlatform;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Host
    let host = VirtualHost::new(config.host.switches.iter().cloned());
    tracing::info!(switches = config.host.switches.len(), "virtual host ready");

    // Platforms
    let mut fans = GenericFanPlatform::new(
        config.fans,
        Arc::clone(&host.switches),
        Arc::clone(&host.scripts),
    );
    fans.attach(&host.bus, &host.store).await?;
    log_entities(&fans);

    let mut repeaters = if config.repeaters.is_empty() {
        None
    } else {
        match RepeaterPlatform::new(config.repeaters, Arc::clone(&host.switches)) {
            Ok(platform) => Some(platform),
            Err(err) => {
                tracing::error!(error = %err, "repeater platform not started");
                None
            }
        }
    };
    if let Some(platform) = repeaters.as_mut() {
        platform.attach(&host.bus, &host.store).await?;
        log_entities(&*platform);
    }

    tracing::info!("plughubd running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    fans.detach(&host.store).await?;
    if let Some(platform) = repeaters.as_mut() {
        platform.detach(&host.store).await?;
    }

    Ok(())
}

fn log_entities(platform: &impl Platform) {
    match platform.entities() {
        Ok(entities) => {
            for entity in entities {
                tracing::info!(
                    platform = platform.name(),
                    entity_id = %entity.entity_id,
                    state = %entity.state,
                    available = entity.available,
                    "entity registered"
                );
            }
        }
        Err(err) => {
            tracing::error!(platform = platform.name(), error = %err, "unable to list entities");
        }
    }
}
