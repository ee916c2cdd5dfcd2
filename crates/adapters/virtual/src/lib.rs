//! # plughub-adapter-virtual
//!
//! In-memory stand-in for an automation host, used by the daemon and by
//! integration tests.
//!
//! ## Provided collaborators
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualSwitchBank`] | `BinarySwitch` | Switches start `off`; changes are published on the bus |
//! | [`VirtualScriptRunner`] | `ScriptRunner` | Records invocations, can be told to fail |
//! | [`InMemoryStateStore`] | `StateStore` | Last entity snapshot per id, for the process lifetime |
//! | `InProcessEventBus` | `EventNotifier` | Re-exported from `plughub-app` |
//!
//! ## Dependency rule
//!
//! Depends on `plughub-app` (port traits) and `plughub-domain` only.

mod error;
mod script_runner;
mod state_store;
mod switch_bank;

pub use error::VirtualError;
pub use script_runner::{Invocation, VirtualScriptRunner};
pub use state_store::InMemoryStateStore;
pub use switch_bank::VirtualSwitchBank;

use std::sync::Arc;

use plughub_app::event_bus::InProcessEventBus;
use plughub_domain::id::EntityId;

const BUS_CAPACITY: usize = 256;

/// Every virtual collaborator, wired to one event bus.
#[derive(Clone)]
pub struct VirtualHost {
    pub bus: Arc<InProcessEventBus>,
    pub switches: Arc<VirtualSwitchBank<Arc<InProcessEventBus>>>,
    pub scripts: Arc<VirtualScriptRunner>,
    pub store: Arc<InMemoryStateStore>,
}

impl VirtualHost {
    /// Build a host exposing `switch_ids`, all initially `off`.
    #[must_use]
    pub fn new(switch_ids: impl IntoIterator<Item = EntityId>) -> Self {
        let bus = Arc::new(InProcessEventBus::new(BUS_CAPACITY));
        let switches = Arc::new(VirtualSwitchBank::new(Arc::clone(&bus)));
        for entity_id in switch_ids {
            switches.add_switch(entity_id);
        }
        Self {
            bus,
            switches,
            scripts: Arc::new(VirtualScriptRunner::default()),
            store: Arc::new(InMemoryStateStore::default()),
        }
    }
}
