//! # plughub-app
//!
//! Application layer — **port definitions** (traits) for the host
//! collaborators, plus the in-process infrastructure shared by platforms.
//!
//! ## Responsibilities
//! - Define **port traits** the host (or a virtual stand-in) must implement:
//!   - `BinarySwitch` — read / set an on-off switch by entity id
//!   - `ScriptRunner` — invoke a host script with parameters
//!   - `StateStore` — last persisted state of an entity
//!   - `EventNotifier` — state-change subscriptions
//!   - `EventPublisher` — publish state changes onto the bus
//! - Define the **`Platform`** lifecycle trait implemented by every platform
//! - Provide **in-process infrastructure** (event bus, refresh watcher) that
//!   doesn't need IO
//!
//! ## Dependency rule
//! Depends on `plughub-domain` only (plus `tokio` for channels and tasks).
//! Never imports platform or adapter crates.

pub mod event_bus;
pub mod ports;
pub mod watch;
