//! # sceneguard-app
//!
//! Application layer: **port definitions** (traits) and the validator use-case.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SceneInventory`: load persisted scene definitions
//!   - `EntityResolver`: map external resource ids to local entities
//!   - `StateReader`: read the current state of an entity
//!   - `ActionInvoker`: re-activate a scene or drive a single entity
//!   - `Notifier`: raise operator notifications
//!   - `NoticePublisher`: feed activation notices into the validator
//!   - `Clock`: current time
//! - Define the **driving/inbound port** `ValidatorControl` used by the HTTP adapter
//! - Provide **in-process infrastructure** (notice bus, log notifier) that doesn't need IO
//! - Run the gates and the 3-level escalation in [`validator::SceneValidator`]
//!
//! ## Dependency rule
//! Depends on `sceneguard-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod config;
pub mod event_bus;
pub mod notifier;
pub mod ports;
pub mod validator;
