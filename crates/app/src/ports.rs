//! Port definitions — traits that the host and adapters implement.
//!
//! Ports are the boundaries between the platforms and the host framework.
//! They are defined here (in `app`) so that platforms and host adapters can
//! both depend on them without depending on each other.

pub mod event_bus;
pub mod notifier;
pub mod platform;
pub mod script;
pub mod state_store;
pub mod switch;

pub use event_bus::EventPublisher;
pub use notifier::{ChangeListener, EventNotifier, Subscription};
pub use platform::Platform;
pub use script::{ScriptParams, ScriptRunner};
pub use state_store::StateStore;
pub use switch::BinarySwitch;
